use axum::{body::Bytes, extract::Multipart};

use crate::error::{AppError, AppResult};

/// Largest accepted image upload (2 MiB).
pub const MAX_IMAGE_BYTES: usize = 2048 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content_type: None,
            bytes: bytes.into(),
        }
    }
}

/// Image formats accepted for product images and brand logos, detected from
/// the file contents rather than the client-supplied content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageKind::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else if bytes.len() >= 14 && bytes.starts_with(b"BM") {
            Some(ImageKind::Bmp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRejection {
    NotAnImage,
    TooLarge,
}

impl ImageRejection {
    /// Validation message for this rejection, e.g. `subject` = "The logo".
    pub fn message(self, subject: &str) -> String {
        match self {
            ImageRejection::NotAnImage => format!("{subject} must be an image."),
            ImageRejection::TooLarge => format!("{subject} must not weigh more than 2MB."),
        }
    }
}

/// Every rule the file breaks, in rule order.
pub fn check_image(file: &UploadedFile) -> Result<ImageKind, Vec<ImageRejection>> {
    let kind = ImageKind::sniff(&file.bytes);
    let mut rejections = Vec::new();
    if kind.is_none() {
        rejections.push(ImageRejection::NotAnImage);
    }
    if file.bytes.len() > MAX_IMAGE_BYTES {
        rejections.push(ImageRejection::TooLarge);
    }
    match kind {
        Some(kind) if rejections.is_empty() => Ok(kind),
        _ => Err(rejections),
    }
}

/// A fully buffered `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<(String, UploadedFile)>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    // An untouched file input still submits an empty part.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push((
                        name,
                        UploadedFile {
                            file_name: Some(file_name),
                            content_type,
                            bytes,
                        },
                    ));
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?;
                    form.fields.push((name, value));
                }
            }
        }
        Ok(form)
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.push((name.into(), file));
    }

    /// Last value submitted for `name`, trimmed. Blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Every value submitted for `name` or `name[]`, in order.
    pub fn texts<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| is_field(key, name))
            .map(|(_, value)| value.trim())
    }

    /// Every file submitted for `name` or `name[]`, in order.
    pub fn files(&self, name: &str) -> Vec<UploadedFile> {
        self.files
            .iter()
            .filter(|(key, _)| is_field(key, name))
            .map(|(_, file)| file.clone())
            .collect()
    }
}

fn is_field(key: &str, name: &str) -> bool {
    key == name || key.strip_suffix("[]") == Some(name)
}
