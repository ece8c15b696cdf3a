//! Buildpack repositories

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::api::client::CloudControllerClient;
use crate::api::types::{Buildpack, BuildpackEntity, BuildpackUpdate};
use crate::core::{FoundryError, FoundryResult};

/// Reads and updates buildpack records
#[async_trait]
pub trait BuildpackRepository: Send + Sync {
    /// Find a buildpack by its name
    async fn find_by_name(&self, name: &str) -> FoundryResult<Buildpack>;

    /// Apply a partial update and return the updated buildpack
    async fn update(&self, update: &BuildpackUpdate) -> FoundryResult<Buildpack>;
}

/// Uploads buildpack archives
#[async_trait]
pub trait BuildpackBitsRepository: Send + Sync {
    /// Upload the bits found at `path` (archive, directory or URL) to `buildpack`
    async fn upload_buildpack(&self, buildpack: &Buildpack, path: &str) -> FoundryResult<()>;
}

pub struct CloudControllerBuildpackRepository {
    gateway: Arc<CloudControllerClient>,
}

impl CloudControllerBuildpackRepository {
    pub fn new(gateway: Arc<CloudControllerClient>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl BuildpackRepository for CloudControllerBuildpackRepository {
    async fn find_by_name(&self, name: &str) -> FoundryResult<Buildpack> {
        let query = format!("name:{}", name);
        let resources = self
            .gateway
            .list_resources::<BuildpackEntity>("/v2/buildpacks", &[("q", query.as_str())])
            .await?;

        resources
            .into_iter()
            .next()
            .map(Buildpack::from)
            .ok_or_else(|| FoundryError::not_found("Buildpack", name))
    }

    async fn update(&self, update: &BuildpackUpdate) -> FoundryResult<Buildpack> {
        let path = format!("/v2/buildpacks/{}", update.guid);
        let resource = self
            .gateway
            .update_resource::<_, BuildpackEntity>(&path, update)
            .await?;

        Ok(Buildpack::from(resource))
    }
}

pub struct CloudControllerBuildpackBitsRepository {
    gateway: Arc<CloudControllerClient>,
}

impl CloudControllerBuildpackBitsRepository {
    pub fn new(gateway: Arc<CloudControllerClient>) -> Self {
        Self { gateway }
    }

    /// Load the archive to upload, returning its file name and contents
    async fn load_archive(&self, path: &str) -> FoundryResult<(String, Vec<u8>)> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let bytes = self.gateway.download(path).await?;
            let file_name = path
                .rsplit('/')
                .find(|segment| !segment.is_empty())
                .unwrap_or("buildpack.zip")
                .to_string();
            return Ok((file_name, bytes));
        }

        let local = Path::new(path);
        let metadata = tokio::fs::metadata(local).await.map_err(|e| {
            FoundryError::remote(format!("Error opening buildpack file {}: {}", path, e))
        })?;

        let stem = local
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "buildpack".to_string());

        if metadata.is_dir() {
            let dir = local.to_path_buf();
            let bytes = tokio::task::spawn_blocking(move || zip_directory(&dir))
                .await
                .map_err(|e| FoundryError::remote(e.to_string()))??;
            return Ok((format!("{}.zip", stem), bytes));
        }

        if !is_archive_name(local) {
            return Err(FoundryError::remote(format!(
                "{} is not a valid zip file",
                path
            )));
        }

        let bytes = tokio::fs::read(local).await?;
        Ok((stem, bytes))
    }
}

#[async_trait]
impl BuildpackBitsRepository for CloudControllerBuildpackBitsRepository {
    async fn upload_buildpack(&self, buildpack: &Buildpack, path: &str) -> FoundryResult<()> {
        let (file_name, bytes) = self.load_archive(path).await?;
        tracing::debug!("uploading {} ({} bytes) to buildpack {}", file_name, bytes.len(), buildpack.name);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| FoundryError::remote(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("buildpack", part);

        let url = format!("/v2/buildpacks/{}/bits", buildpack.guid);
        self.gateway.upload(&url, form).await
    }
}

/// Whether `path` names an archive that is uploaded unchanged
fn is_archive_name(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip") || ext.eq_ignore_ascii_case("jar"))
        .unwrap_or(false)
}

/// Zip the contents of `dir`, with its entries at the archive root
pub fn zip_directory(dir: &Path) -> FoundryResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let relative = match entry.path().strip_prefix(dir) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(file_mode(entry.path())?);

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            writer.write_all(&std::fs::read(entry.path())?)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(unix)]
fn file_mode(path: &Path) -> FoundryResult<u32> {
    use std::os::unix::fs::PermissionsExt;
    Ok(std::fs::metadata(path)?.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(path: &Path) -> FoundryResult<u32> {
    Ok(if std::fs::metadata(path)?.is_dir() { 0o755 } else { 0o644 })
}
