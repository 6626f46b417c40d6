//! Mock storage for isolating services in tests.

use mockall::mock;

use crate::storage::LocalStorage;
use crate::storage::errors::StorageResult;

mock! {
    pub Storage {}

    impl LocalStorage for Storage {
        fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
        fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
        fn remove_item(&self, key: &str) -> StorageResult<()>;
    }
}
