use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{ImageUpload, MAX_IMAGE_BYTES},
    services::ImageService,
};
use actix_multipart::{Multipart, MultipartError};
use actix_web::{
    delete, get,
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web, HttpResponse, Responder,
};
use futures::TryStreamExt;

const UPLOAD_FIELD: &str = "image";

fn malformed(err: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {}", err))
}

/// Reads the `image` field of a multipart body into memory.
///
/// Reading stops with a validation error as soon as the field grows past
/// [`MAX_IMAGE_BYTES`]. Other fields are skipped.
pub async fn read_image_upload(mut payload: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        if field.name() != UPLOAD_FIELD {
            while field.try_next().await.map_err(malformed)?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .filter(|name| !name.is_empty())
            .unwrap_or(UPLOAD_FIELD)
            .to_string();
        // Compared verbatim against the allow-list: no case folding, no parameters.
        let content_type = field
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::Validation("File exceeds 10 MB limit".into()));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(ImageUpload {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::Validation("No file uploaded".into()))
}

/// Serves the raw image bytes, rendered inline under the original filename.
#[get("/{id}")]
pub async fn get_image(
    images: web::Data<ImageService>,
    image_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let image = images.get(user.0, image_id.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(image.filename)],
        })
        .body(image.data))
}

/// Deletes an image and returns its metadata.
#[delete("/{id}")]
pub async fn delete_image(
    images: web::Data<ImageService>,
    image_id: web::Path<i64>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let image = images.delete(user.0, image_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(image))
}
