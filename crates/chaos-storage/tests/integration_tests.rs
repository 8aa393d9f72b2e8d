//! Integration tests for chaos-storage

use chaos_storage::{
    storage_client, CloudStorage, FileInfo, FileStatus, ObjectPath, Storage, StorageClient, StorageError,
    StorageServer, UfileStorageClient,
};
use chaos_testing::fixtures::random_bytes;
use chaos_testing::{ChunkedReader, TestDir};
use object_store::memory::InMemory;
use object_store::{Attribute, ObjectStore};
use std::fs::File;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn config() -> CloudStorage {
    CloudStorage {
        region: "cn-sh2".to_string(),
        bucket: "media".to_string(),
        style_name: Some("?iopcmd=thumbnail".to_string()),
        worker_threads: 1,
        ..CloudStorage::default()
    }
}

fn client() -> (UfileStorageClient, Arc<InMemory>) {
    let store = Arc::new(InMemory::new());
    let client = UfileStorageClient::with_store(store.clone(), config()).unwrap();
    (client, store)
}

#[test]
fn test_upload_completes_file_info() {
    let (client, store) = client();
    let data = random_bytes(20_000, 9);
    let mut reader = ChunkedReader::new(data.clone(), 1000);

    let info = FileInfo::new("img/cat.png").with_content_type("image/png");
    let uploaded = client.upload(&mut reader, info).unwrap();

    assert_eq!(uploaded.status, FileStatus::UploadSuccess);
    assert!(uploaded.is_uploaded());
    assert_eq!(uploaded.size, Some(20_000));
    assert!(uploaded.e_tag.is_some());
    assert!(uploaded.upload_time.unwrap() > 0);
    assert_eq!(
        uploaded.url.as_deref(),
        Some("https://media.cn-sh2.ufileos.com/img/cat.png?iopcmd=thumbnail")
    );

    let rt = Runtime::new().unwrap();
    let stored = rt.block_on(store.get(&ObjectPath::from("img/cat.png"))).unwrap();
    assert_eq!(
        stored.attributes.get(&Attribute::ContentType).map(|v| &**v),
        Some("image/png")
    );
    let bytes = rt.block_on(stored.bytes()).unwrap();
    assert_eq!(&bytes[..], &data[..]);
}

#[test]
fn test_upload_from_file() {
    let dir = TestDir::new().unwrap();
    let path = dir.create_file("report.txt", b"quarterly numbers").unwrap();
    let (client, _store) = client();

    let mut file = File::open(&path).unwrap();
    let uploaded = client
        .upload(&mut file, FileInfo::new("docs/report.txt").with_name("report.txt"))
        .unwrap();
    assert_eq!(uploaded.name.as_deref(), Some("report.txt"));
    assert_eq!(uploaded.size, Some(17));
}

#[test]
fn test_delete_and_delete_all() {
    let (client, store) = client();
    for key in ["a.txt", "b.txt", "c.txt"] {
        client.upload(&mut &b"data"[..], FileInfo::new(key)).unwrap();
    }

    client.delete("a.txt").unwrap();
    client
        .delete_all(&["b.txt".to_string(), "c.txt".to_string()])
        .unwrap();

    let rt = Runtime::new().unwrap();
    for key in ["a.txt", "b.txt", "c.txt"] {
        assert!(rt.block_on(store.head(&ObjectPath::from(key))).is_err(), "{} still present", key);
    }
}

#[test]
fn test_storage_client_factory() {
    let memory = storage_client(Storage::new(StorageServer::Memory, config())).unwrap();
    let uploaded = memory.upload(&mut &b"hi"[..], FileInfo::new("k")).unwrap();
    assert_eq!(uploaded.status, FileStatus::UploadSuccess);

    let err = memory.upload(&mut &b"hi"[..], FileInfo::new("")).unwrap_err();
    assert!(matches!(err, StorageError::InvalidArgument(_)));
}

#[test]
fn test_source_failure_is_reported() {
    struct Broken;
    impl std::io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let (client, _store) = client();
    let err = client.upload(&mut Broken, FileInfo::new("k")).unwrap_err();
    let io_err: std::io::Error = err.into();
    assert_eq!(io_err.kind(), std::io::ErrorKind::ConnectionReset);
}
