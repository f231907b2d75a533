#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use stepdish_core::image::RawImage;
use stepdish_core::session::{AuthUser, SessionContext};
use stepdish_core::step_list::{StepList, StepPatch};
use stepdish_db::MemoryStore;
use stepdish_pipeline::{AppContext, PublishPipeline, RecipeForm};
use stepdish_storage::memory::MemoryBlobStore;
use uuid::Uuid;

pub const BUCKET: &str = "recipe-images";

/// In-memory stores wired into an [`AppContext`], plus a signed-in author.
pub struct Harness {
    pub records: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub ctx: AppContext,
    pub user: AuthUser,
    pub session: SessionContext,
}

impl Harness {
    pub fn new() -> Self {
        let records = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let ctx = AppContext::new(records.clone(), blobs.clone()).with_bucket(BUCKET);
        let user = new_user("cook@example.com");
        let session = SessionContext::signed_in(user.clone());
        Self {
            records,
            blobs,
            ctx,
            user,
            session,
        }
    }

    pub fn pipeline(&self) -> PublishPipeline {
        PublishPipeline::new(self.ctx.clone())
    }

    /// Storage paths currently in the bucket.
    pub async fn stored_paths(&self) -> Vec<String> {
        self.blobs.paths(BUCKET).await
    }

    /// Decode the stored object behind `url` and report its size.
    pub async fn stored_dimensions(&self, url: &str) -> (u32, u32) {
        let path = MemoryBlobStore::path_from_url(BUCKET, url).expect("memory url");
        let blob = self.blobs.get(BUCKET, path).await.expect("stored blob");
        assert_eq!(blob.content_type, "image/jpeg");
        let img = image::load_from_memory(&blob.bytes).expect("decodable jpeg");
        (img.width(), img.height())
    }
}

pub fn new_user(email: &str) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
    }
}

/// Encode a gradient of the given size as PNG.
pub fn png(width: u32, height: u32) -> RawImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("png encode");
    RawImage::new(buf.into_inner()).with_file_name("photo.png")
}

/// Build an editor list from `(image, description)` rows.
pub fn editor(rows: Vec<(Option<RawImage>, &str)>) -> StepList {
    let mut list = StepList::new();
    for (index, (image, description)) in rows.into_iter().enumerate() {
        list.insert();
        list.update(
            index,
            StepPatch {
                description: Some(description.to_string()),
                image,
                image_url: None,
            },
        );
    }
    list
}

pub fn form(title: &str) -> RecipeForm {
    RecipeForm {
        title: title.to_string(),
        ..RecipeForm::default()
    }
}
