//! In-memory collaborators and EXIF fixtures for tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use skymap_core::{AppError, NewSkyImage, SkyImage, StorageBackend};
use skymap_db::SkyImageStore;
use skymap_storage::{Storage, StorageError, StorageResult};

/// GPS tags to embed in a fixture; `None` leaves the tag out.
#[derive(Debug, Clone, Copy)]
pub struct GpsFixture {
    pub latitude: Option<[u32; 3]>,
    pub latitude_ref: Option<&'static str>,
    pub longitude: Option<[u32; 3]>,
    pub longitude_ref: Option<&'static str>,
}

impl GpsFixture {
    /// 28°36'0" N, 77°12'0" E
    pub fn delhi() -> Self {
        Self {
            latitude: Some([28, 36, 0]),
            latitude_ref: Some("N"),
            longitude: Some([77, 12, 0]),
            longitude_ref: Some("E"),
        }
    }
}

fn dms_field(tag: Tag, dms: [u32; 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(dms.iter().map(|&v| Rational::from((v, 1))).collect()),
    }
}

fn ascii_field(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn write_tiff(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).expect("write TIFF fixture");
    buf.into_inner()
}

/// A bare TIFF container carrying the requested GPS tags plus a camera make.
pub fn gps_tiff(fixture: GpsFixture) -> Vec<u8> {
    let mut fields = vec![ascii_field(Tag::Make, "SkyCam")];
    if let Some(dms) = fixture.latitude {
        fields.push(dms_field(Tag::GPSLatitude, dms));
    }
    if let Some(reference) = fixture.latitude_ref {
        fields.push(ascii_field(Tag::GPSLatitudeRef, reference));
    }
    if let Some(dms) = fixture.longitude {
        fields.push(dms_field(Tag::GPSLongitude, dms));
    }
    if let Some(reference) = fixture.longitude_ref {
        fields.push(ascii_field(Tag::GPSLongitudeRef, reference));
    }
    write_tiff(&fields)
}

/// A TIFF container with EXIF but no GPS tags at all.
pub fn tiff_without_gps() -> Vec<u8> {
    write_tiff(&[ascii_field(Tag::Make, "SkyCam")])
}

/// Record store backed by a vector; inserts can be made to fail.
#[derive(Default)]
pub struct MockSkyImageStore {
    rows: Mutex<Vec<SkyImage>>,
    next_id: AtomicI64,
    fail_inserts: AtomicBool,
    insert_calls: AtomicUsize,
}

impl MockSkyImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.set_fail_inserts(true);
        store
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<SkyImage> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SkyImageStore for MockSkyImageStore {
    async fn insert(&self, image: NewSkyImage) -> Result<SkyImage, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }

        let record = SkyImage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            image_url: image.image_url,
            latitude: image.coordinate.latitude,
            longitude: image.coordinate.longitude,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<SkyImage>, AppError> {
        Ok(self.rows())
    }

    async fn get(&self, id: i64) -> Result<Option<SkyImage>, AppError> {
        Ok(self.rows().into_iter().find(|row| row.id == id))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Object store backed by a map; counts writes and can be made to fail them.
#[derive(Default)]
pub struct MockStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    write_calls: AtomicUsize,
}

impl MockStorage {
    pub const BASE_URL: &'static str = "https://cdn.test";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let storage = Self::default();
        storage.fail_writes.store(true, Ordering::SeqCst);
        storage
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", Self::BASE_URL, storage_key)
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
