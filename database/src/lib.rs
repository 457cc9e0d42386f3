use core::ops::RangeFrom;
use std::{
    borrow::Cow,
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use anyhow::Result;
use bytesize::ByteSize;
use im::OrdMap;
use itertools::Either;
use libmdbx::{DatabaseFlags, Environment, Geometry, WriteFlags};
use log::info;
use snap::raw::{Decoder, Encoder};
use tap::Pipe as _;

const GROWTH_STEP: ByteSize = ByteSize::mib(256);

#[derive(Clone, Copy)]
pub enum DatabaseMode {
    ReadOnly,
    ReadWrite,
}

impl DatabaseMode {
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }

    #[must_use]
    pub const fn mode_permissions(self) -> u16 {
        match self {
            // <https://erthink.github.io/libmdbx/group__c__opening.html#gabb7dd3b10dd31639ba252df545e11768>
            // The UNIX permissions to set on created files. Zero value means to open existing, but do not create.
            Self::ReadOnly => 0,
            Self::ReadWrite => 0o600,
        }
    }

    #[must_use]
    #[cfg(target_os = "linux")]
    pub fn permissions(self) -> u32 {
        self.mode_permissions().into()
    }

    #[must_use]
    #[cfg(not(target_os = "linux"))]
    pub const fn permissions(self) -> u16 {
        self.mode_permissions()
    }
}

/// Key-value store with named buckets.
///
/// Buckets map to named `libmdbx` databases in the persistent backend and to
/// independent ordered maps in the in-memory one. Values are stored
/// snappy-compressed in both.
pub struct Database(DatabaseKind);

impl Database {
    pub fn persistent(
        directory: impl AsRef<Path>,
        max_size: ByteSize,
        mode: DatabaseMode,
        buckets: &[&'static str],
    ) -> Result<Self> {
        if !mode.is_read_only() {
            fs_err::create_dir_all(&directory)?;
        }

        let environment = Environment::builder()
            .set_max_dbs(buckets.len())
            .set_geometry(Geometry {
                size: Some(..usize::try_from(max_size.as_u64())?),
                growth_step: Some(isize::try_from(GROWTH_STEP.as_u64())?),
                shrink_threshold: None,
                page_size: None,
            })
            .open_with_permissions(directory.as_ref(), mode.permissions())?;

        if !mode.is_read_only() {
            let transaction = environment.begin_rw_txn()?;

            for bucket in buckets {
                transaction.create_db(Some(bucket), DatabaseFlags::default())?;
            }

            transaction.commit()?;
        }

        info!(
            "opened state archive database at {} with {} buckets",
            directory.as_ref().display(),
            buckets.len(),
        );

        Ok(Self(DatabaseKind::Persistent { environment }))
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self(DatabaseKind::InMemory {
            buckets: Mutex::default(),
        })
    }

    pub fn contains_key(&self, bucket: &'static str, key: impl AsRef<[u8]>) -> Result<bool> {
        let contains_key = match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_ro_txn()?;
                let database = transaction.open_db(Some(bucket))?;
                transaction
                    .get::<()>(database.dbi(), key.as_ref())?
                    .is_some()
            }
            DatabaseKind::InMemory { buckets } => buckets
                .lock()
                .expect("in-memory database mutex is poisoned")
                .get(bucket)
                .is_some_and(|map| map.contains_key(key.as_ref())),
        };

        Ok(contains_key)
    }

    pub fn get(&self, bucket: &'static str, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_ro_txn()?;
                let database = transaction.open_db(Some(bucket))?;

                transaction
                    .get::<Cow<_>>(database.dbi(), key.as_ref())?
                    .map(|compressed| decompress(&compressed))
            }
            DatabaseKind::InMemory { buckets } => buckets
                .lock()
                .expect("in-memory database mutex is poisoned")
                .get(bucket)
                .and_then(|map| map.get(key.as_ref()))
                .map(|compressed| decompress(compressed)),
        }
        .transpose()
    }

    /// Returns all pairs with keys greater than or equal to the start of
    /// `range`, in ascending key order. This is the cursor primitive the
    /// state reader builds its prefix scans on.
    #[expect(clippy::type_complexity)]
    pub fn iterator_ascending(
        &self,
        bucket: &'static str,
        range: RangeFrom<impl AsRef<[u8]>>,
    ) -> Result<impl Iterator<Item = Result<(Cow<[u8]>, Vec<u8>)>>> {
        let start = range.start.as_ref();

        match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_ro_txn()?;
                let database = transaction.open_db(Some(bucket))?;

                let mut cursor = transaction.cursor(&database)?;

                cursor
                    .set_range(start)
                    .transpose()
                    .into_iter()
                    .chain(core::iter::from_fn(move || cursor.next().transpose()))
                    .map(|result| decompress_pair(result?))
                    .pipe(Either::Left)
            }
            DatabaseKind::InMemory { buckets } => {
                let buckets = buckets
                    .lock()
                    .expect("in-memory database mutex is poisoned");
                let map = buckets.get(bucket).cloned().unwrap_or_default();
                let start_pair = map.get_key_value(start).map(clone_pair);
                let (_, above) = map.split(start);

                start_pair
                    .into_iter()
                    .chain(above)
                    .map(|(key, value)| Ok((Cow::Owned(key.to_vec()), decompress(value.as_ref())?)))
                    .pipe(Either::Right)
            }
        }
        .pipe(Ok)
    }

    pub fn put(
        &self,
        bucket: &'static str,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        self.put_batch(bucket, core::iter::once((key, value)))
    }

    pub fn put_batch(
        &self,
        bucket: &'static str,
        pairs: impl IntoIterator<Item = (impl AsRef<[u8]>, impl AsRef<[u8]>)>,
    ) -> Result<()> {
        match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_rw_txn()?;
                let database = transaction.open_db(Some(bucket))?;

                for (key, value) in pairs {
                    let compressed = compress(value.as_ref())?;
                    transaction.put(
                        database.dbi(),
                        key.as_ref(),
                        compressed,
                        WriteFlags::default(),
                    )?;
                }

                transaction.commit()?;
            }
            DatabaseKind::InMemory { buckets } => {
                let mut buckets = buckets
                    .lock()
                    .expect("in-memory database mutex is poisoned");
                let map = buckets.entry(bucket).or_default();
                let mut new_map = map.clone();

                for (key, value) in pairs {
                    let key = key.as_ref().into();
                    let compressed = compress(value.as_ref())?.into();
                    new_map.insert(key, compressed);
                }

                *map = new_map;
            }
        }

        Ok(())
    }

    /// Returns the last key-value pair whose key is less than or equal to `key`.
    ///
    /// Behaves like [`im::OrdMap::get_prev`].
    ///
    /// [`im::OrdMap::get_prev`]: https://docs.rs/im/15.1.0/im/ordmap/struct.OrdMap.html#method.get_prev
    pub fn prev(
        &self,
        bucket: &'static str,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_ro_txn()?;
                let database = transaction.open_db(Some(bucket))?;

                let mut cursor = transaction.cursor(&database)?;

                cursor
                    .set_key(key.as_ref())
                    .transpose()
                    .or_else(|| cursor.prev().transpose())
                    .transpose()?
                    .map(decompress_pair)
            }
            DatabaseKind::InMemory { buckets } => buckets
                .lock()
                .expect("in-memory database mutex is poisoned")
                .get(bucket)
                .and_then(|map| map.get_prev(key.as_ref()).map(clone_pair))
                .map(|(key, value)| Ok((key.to_vec(), decompress(&value)?))),
        }
        .transpose()
    }

    /// Returns the first key-value pair whose key is greater than or equal to `key`.
    ///
    /// Behaves like [`im::OrdMap::get_next`].
    ///
    /// [`im::OrdMap::get_next`]: https://docs.rs/im/15.1.0/im/ordmap/struct.OrdMap.html#method.get_next
    pub fn next(
        &self,
        bucket: &'static str,
        key: impl AsRef<[u8]>,
    ) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        match self.kind() {
            DatabaseKind::Persistent { environment } => {
                let transaction = environment.begin_ro_txn()?;
                let database = transaction.open_db(Some(bucket))?;

                let mut cursor = transaction.cursor(&database)?;

                cursor.set_range(key.as_ref())?.map(decompress_pair)
            }
            DatabaseKind::InMemory { buckets } => buckets
                .lock()
                .expect("in-memory database mutex is poisoned")
                .get(bucket)
                .and_then(|map| map.get_next(key.as_ref()).map(clone_pair))
                .map(|(key, value)| Ok((key.to_vec(), decompress(&value)?))),
        }
        .transpose()
    }

    const fn kind(&self) -> &DatabaseKind {
        &self.0
    }
}

enum DatabaseKind {
    Persistent {
        environment: Environment,
    },
    InMemory {
        // The elements of these maps are cloned by various methods of
        // `Database`, so they should be cheaply cloneable. This disqualifies
        // `Vec<u8>` and `Box<[u8]>`.
        buckets: Mutex<HashMap<&'static str, InMemoryBucket>>,
    },
}

type InMemoryBucket = OrdMap<Arc<[u8]>, Arc<[u8]>>;

fn clone_pair((key, value): (&Arc<[u8]>, &Arc<[u8]>)) -> (Arc<[u8]>, Arc<[u8]>) {
    (Arc::clone(key), Arc::clone(value))
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    Encoder::new().compress_vec(data).map_err(Into::into)
}

fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    Decoder::new().decompress_vec(data).map_err(Into::into)
}

fn decompress_pair<K>((key, compressed_value): (K, Cow<[u8]>)) -> Result<(K, Vec<u8>)> {
    let value = decompress(&compressed_value)?;
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    const ROOTS: &str = "roots";
    const DIFFS: &str = "diffs";
    const BUCKETS: &[&str] = &[ROOTS, DIFFS];

    type Constructor = fn() -> Result<Database>;

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_get(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        assert_eq!(database.get(ROOTS, "B")?, Some(to_bytes("2")));
        assert_eq!(database.get(ROOTS, "D")?, None);

        Ok(())
    }

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_contains_key(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        assert!(database.contains_key(ROOTS, "A")?);
        assert!(!database.contains_key(ROOTS, "D")?);
        assert!(!database.contains_key(DIFFS, "A")?);

        Ok(())
    }

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_iterator_ascending(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        assert_pairs_eq(
            database.iterator_ascending(ROOTS, "0"..)?,
            [("A", "1"), ("B", "2"), ("C", "3"), ("E", "5")],
        )?;

        assert_pairs_eq(
            database.iterator_ascending(ROOTS, "B"..)?,
            [("B", "2"), ("C", "3"), ("E", "5")],
        )?;

        assert_pairs_eq(database.iterator_ascending(ROOTS, "D"..)?, [("E", "5")])?;
        assert_pairs_eq(database.iterator_ascending(ROOTS, "F"..)?, [])?;

        Ok(())
    }

    // ```text
    // 0 A B C D E F
    //   │ │ ├─┘ ├─┘
    //   A B C   E
    // ```
    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_prev(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        assert!("0" < "A");

        assert_eq!(database.prev(ROOTS, "0")?, None);
        assert_eq!(database.prev(ROOTS, "A")?, Some(to_bytes_pair(("A", "1"))));
        assert_eq!(database.prev(ROOTS, "D")?, Some(to_bytes_pair(("C", "3"))));
        assert_eq!(database.prev(ROOTS, "F")?, Some(to_bytes_pair(("E", "5"))));

        Ok(())
    }

    // ```text
    // 0 A B C D E F
    // └─┤ │ │ └─┤
    //   A B C   E
    // ```
    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_next(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        assert_eq!(database.next(ROOTS, "0")?, Some(to_bytes_pair(("A", "1"))));
        assert_eq!(database.next(ROOTS, "D")?, Some(to_bytes_pair(("E", "5"))));
        assert_eq!(database.next(ROOTS, "F")?, None);

        Ok(())
    }

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_buckets_are_isolated(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        database.put(DIFFS, "A", "9")?;

        assert_eq!(database.get(DIFFS, "A")?, Some(to_bytes("9")));
        assert_eq!(database.get(ROOTS, "A")?, Some(to_bytes("1")));
        assert_pairs_eq(database.iterator_ascending(DIFFS, "A"..)?, [("A", "9")])?;

        Ok(())
    }

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_iterators_are_isolated_from_later_writes(constructor: Constructor) -> Result<()> {
        let database = constructor()?;
        let iterator = database.iterator_ascending(ROOTS, "A"..)?;

        database.put(ROOTS, "D", "4")?;

        assert_pairs_eq(iterator, [("A", "1"), ("B", "2"), ("C", "3"), ("E", "5")])?;

        Ok(())
    }

    #[test_case(build_persistent_database)]
    #[test_case(build_in_memory_database)]
    fn test_overwriting_a_key(constructor: Constructor) -> Result<()> {
        let database = constructor()?;

        database.put_batch(ROOTS, [("A", "1"), ("A", "2"), ("A", "3")])?;

        assert_eq!(database.get(ROOTS, "A")?, Some(to_bytes("3")));

        Ok(())
    }

    fn build_persistent_database() -> Result<Database> {
        let directory = TempDir::new()?;
        let database = Database::persistent(
            directory.keep(),
            ByteSize::mib(1),
            DatabaseMode::ReadWrite,
            BUCKETS,
        )?;

        populate_database(&database)?;
        Ok(database)
    }

    fn build_in_memory_database() -> Result<Database> {
        let database = Database::in_memory();
        populate_database(&database)?;
        Ok(database)
    }

    fn populate_database(database: &Database) -> Result<()> {
        database.put_batch(ROOTS, [("A", "1"), ("B", "2"), ("C", "3")])?;
        database.put(ROOTS, "E", "5")?;
        Ok(())
    }

    fn assert_pairs_eq<'strings>(
        actual_pairs: impl IntoIterator<Item = Result<(impl AsRef<[u8]>, impl AsRef<[u8]>)>>,
        expected_pairs: impl IntoIterator<Item = (&'strings str, &'strings str)>,
    ) -> Result<()> {
        let actual_pairs = to_string_pairs(actual_pairs)?;
        let expected_pairs = to_string_pairs(expected_pairs.into_iter().map(Ok))?;

        assert_eq!(actual_pairs, expected_pairs);

        Ok(())
    }

    fn to_string_pairs(
        pairs: impl IntoIterator<Item = Result<(impl AsRef<[u8]>, impl AsRef<[u8]>)>>,
    ) -> Result<Vec<(String, String)>> {
        pairs
            .into_iter()
            .map(|result| {
                let (key, value) = result?;
                let key_string = core::str::from_utf8(key.as_ref())?;
                let value_string = core::str::from_utf8(value.as_ref())?;
                Ok((key_string.to_owned(), value_string.to_owned()))
            })
            .collect()
    }

    fn to_bytes_pair((key, value): (&str, &str)) -> (Vec<u8>, Vec<u8>) {
        (to_bytes(key), to_bytes(value))
    }

    fn to_bytes(string: &str) -> Vec<u8> {
        string.as_bytes().to_vec()
    }
}
