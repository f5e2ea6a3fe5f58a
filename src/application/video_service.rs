use crate::application::workspace::TempWorkspace;
use crate::domain::manifest;
use crate::domain::naming;
use crate::domain::video::{
    MergeRequest, MergedVideo, NewVideo, ShareLink, ShareRequest, TrimOutcome, TrimRequest,
    VideoRecord, VideoUpdate,
};
use crate::error::VideoError;
use crate::ports::{MediaTool, StoragePort, VideoRepository};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bounds applied to every upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaLimits {
    pub max_file_size_mb: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

impl MediaLimits {
    fn max_bytes(&self) -> u64 {
        (self.max_file_size_mb * 1024.0 * 1024.0) as u64
    }

    /// Inclusive on both ends
    fn accepts_duration(&self, duration: f64) -> bool {
        duration >= self.min_duration && duration <= self.max_duration
    }
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            max_file_size_mb: 25.0,
            min_duration: 5.0,
            max_duration: 300.0,
        }
    }
}

/// Upload, trim, merge and share on top of the storage, metadata and media
/// tool ports. Holds no per-request state; every operation works in its own
/// [`TempWorkspace`] under `scratch_dir`.
#[derive(Clone)]
pub struct VideoService {
    storage: Arc<dyn StoragePort>,
    repo: Arc<dyn VideoRepository>,
    media: Arc<dyn MediaTool>,
    limits: MediaLimits,
    scratch_dir: PathBuf,
}

impl VideoService {
    pub fn new(
        storage: Arc<dyn StoragePort>,
        repo: Arc<dyn VideoRepository>,
        media: Arc<dyn MediaTool>,
        limits: MediaLimits,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            storage,
            repo,
            media,
            limits,
            scratch_dir,
        }
    }

    pub fn limits(&self) -> &MediaLimits {
        &self.limits
    }

    /// Validate and store an uploaded video.
    ///
    /// Size and duration are both checked before anything is written to the
    /// object store or the metadata store.
    pub async fn upload<S, E>(&self, filename: &str, body: S) -> Result<VideoRecord, VideoError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let filename = naming::client_filename(filename).ok_or_else(|| {
            VideoError::InvalidRequest("A file with a valid filename is required".to_string())
        })?;

        let workspace = TempWorkspace::create_in(&self.scratch_dir)?;
        let local_path = workspace.path_for(&naming::local_name(&filename));

        let max_bytes = self.limits.max_bytes();
        let written = stream_to_file(&local_path, body, max_bytes).await?;
        if written > max_bytes {
            tracing::info!(filename = %filename, max_mb = self.limits.max_file_size_mb, "Upload rejected: file too large");
            return Err(VideoError::PayloadTooLarge {
                max_mb: self.limits.max_file_size_mb,
            });
        }
        let size = naming::bytes_to_mb(written);

        let duration = self.media.probe_duration(&local_path).await?;
        if !self.limits.accepts_duration(duration) {
            tracing::info!(filename = %filename, duration, "Upload rejected: duration out of range");
            return Err(VideoError::InvalidMedia {
                duration,
                min: self.limits.min_duration,
                max: self.limits.max_duration,
            });
        }

        let key = naming::storage_key(&filename);
        self.storage.upload(&local_path, &key).await?;
        let record = self
            .repo
            .create(NewVideo {
                filename,
                path: key,
                duration,
                size,
            })
            .await?;

        workspace.close();
        tracing::info!(video_id = %record.id, key = %record.path, duration, size_mb = size, "Video uploaded");
        Ok(record)
    }

    pub async fn list(&self) -> Result<Vec<VideoRecord>, VideoError> {
        Ok(self.repo.list().await?)
    }

    pub async fn trim(&self, request: TrimRequest) -> Result<TrimOutcome, VideoError> {
        let video = self.repo.get(request.video_id).await?.ok_or_else(|| {
            VideoError::NotFound("The video you are trying to trim does not exist".to_string())
        })?;

        let interval = request.interval(video.duration);
        if !interval.is_valid() {
            return Err(VideoError::InvalidRange {
                start: interval.start,
                end: interval.end,
            });
        }

        let workspace = TempWorkspace::create_in(&self.scratch_dir)?;
        let source = workspace.path_for(&naming::local_name(&video.filename));
        let output = workspace.path_for(&format!("trimmed_{}", video.filename));

        self.storage.download(&video.path, &source).await?;
        self.media
            .trim(&source, Some(interval.start), Some(interval.end), &output)
            .await?;

        let duration = interval.duration();
        let size = naming::bytes_to_mb(tokio::fs::metadata(&output).await?.len());

        let outcome = if request.save_as_new {
            let filename = naming::trimmed_filename(&video.filename);
            let key = naming::key_for(&filename);
            self.storage.upload(&output, &key).await?;
            let record = self
                .repo
                .create(NewVideo {
                    filename,
                    path: key,
                    duration,
                    size,
                })
                .await?;
            tracing::info!(source_id = %video.id, video_id = %record.id, duration, "Trimmed copy saved");
            TrimOutcome::Copied(record)
        } else {
            // The blob is replaced before the record; a failed update leaves them out of step
            self.storage.upload(&output, &video.path).await?;
            let changes = VideoUpdate {
                duration,
                size,
                path: None,
            };
            let record = match self.repo.update(video.id, changes).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    tracing::error!(video_id = %video.id, key = %video.path, "Record vanished after its blob was trimmed");
                    return Err(VideoError::NotFound(
                        "The video you are trying to trim does not exist".to_string(),
                    ));
                }
                Err(e) => {
                    tracing::error!(video_id = %video.id, key = %video.path, error = %e, "Blob trimmed but metadata update failed");
                    return Err(e.into());
                }
            };
            tracing::info!(video_id = %record.id, duration, "Video trimmed in place");
            TrimOutcome::Updated(record)
        };

        workspace.close();
        Ok(outcome)
    }

    /// Concatenate the videos in request order into a new record.
    pub async fn merge(&self, request: MergeRequest) -> Result<MergedVideo, VideoError> {
        if request.video_ids.len() < 2 {
            return Err(VideoError::InvalidRequest(
                "At least two videos are required to merge".to_string(),
            ));
        }
        if !naming::is_plain_filename(&request.output_filename) {
            return Err(VideoError::InvalidRequest(
                "Invalid output filename".to_string(),
            ));
        }

        let videos = match self.resolve_all(&request.video_ids).await {
            Ok(videos) => videos,
            Err(e @ VideoError::NotFound(_)) => return Err(e),
            Err(e) => return Err(self.merge_failed(e)),
        };

        let record = self
            .merge_resolved(&videos, &request.output_filename)
            .await
            .map_err(|e| self.merge_failed(e))?;

        tracing::info!(
            video_id = %record.id,
            sources = videos.len(),
            duration = record.duration,
            "Videos merged"
        );
        Ok(record.into())
    }

    pub async fn share(&self, request: ShareRequest) -> Result<ShareLink, VideoError> {
        let video = self.repo.get(request.video_id).await?.ok_or_else(|| {
            VideoError::NotFound("The video you are trying to share does not exist".to_string())
        })?;

        let ttl = Duration::try_from_secs_f64(request.expiry_hours * 3600.0)
            .ok()
            .filter(|ttl| !ttl.is_zero())
            .ok_or_else(|| {
                VideoError::LinkGenerationFailed(format!(
                    "invalid expiry of {} hours",
                    request.expiry_hours
                ))
            })?;
        let expiry_time = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                VideoError::LinkGenerationFailed(format!(
                    "invalid expiry of {} hours",
                    request.expiry_hours
                ))
            })?;

        let share_link = self
            .storage
            .signed_url(&video.path, ttl)
            .await
            .map_err(|e| {
                tracing::error!(video_id = %video.id, key = %video.path, error = %e, "Failed to sign share link");
                VideoError::LinkGenerationFailed(e.to_string())
            })?;

        Ok(ShareLink {
            share_link,
            expiry_time,
            video_id: video.id,
            video_name: video.filename,
        })
    }

    /// All-or-nothing: the first unknown id aborts.
    async fn resolve_all(&self, ids: &[Uuid]) -> Result<Vec<VideoRecord>, VideoError> {
        let mut videos = Vec::with_capacity(ids.len());
        for id in ids {
            let video = self.repo.get(*id).await?.ok_or_else(|| {
                tracing::info!(video_id = %id, "Merge source not found");
                VideoError::NotFound("One or more videos do not exist".to_string())
            })?;
            videos.push(video);
        }
        Ok(videos)
    }

    async fn merge_resolved(
        &self,
        videos: &[VideoRecord],
        output_filename: &str,
    ) -> Result<VideoRecord, VideoError> {
        let workspace = TempWorkspace::create_in(&self.scratch_dir)?;

        let inputs = self.download_all(videos, &workspace).await?;
        let manifest_path = workspace.path_for("input_list.txt");
        manifest::write(&manifest_path, &inputs).await?;

        let output = workspace.path_for(&format!("merged_{}_{}", Uuid::new_v4(), output_filename));
        self.media.concat(&manifest_path, &output).await?;

        let duration: f64 = videos.iter().map(|video| video.duration).sum();
        let size = naming::bytes_to_mb(tokio::fs::metadata(&output).await?.len());

        let key = naming::storage_key(output_filename);
        self.storage.upload(&output, &key).await?;
        let record = self
            .repo
            .create(NewVideo {
                filename: output_filename.to_string(),
                path: key,
                duration,
                size,
            })
            .await?;

        workspace.close();
        Ok(record)
    }

    /// Download every video concurrently. The returned paths follow the order
    /// of `videos`, whatever order the downloads finish in.
    async fn download_all(
        &self,
        videos: &[VideoRecord],
        workspace: &TempWorkspace,
    ) -> Result<Vec<PathBuf>, VideoError> {
        let downloads = videos.iter().map(|video| {
            let local_path = workspace.path_for(&naming::local_name(&video.filename));
            async move {
                self.storage.download(&video.path, &local_path).await?;
                if !tokio::fs::try_exists(&local_path).await.unwrap_or(false) {
                    tracing::error!(key = %video.path, local = %local_path.display(), "Downloaded file is missing");
                    return Err(VideoError::DownloadFailed(local_path));
                }
                tracing::debug!(key = %video.path, local = %local_path.display(), "Downloaded merge source");
                Ok::<_, VideoError>(local_path)
            }
        });
        futures::future::try_join_all(downloads).await
    }

    fn merge_failed(&self, cause: VideoError) -> VideoError {
        tracing::error!(error = %cause, code = cause.error_code(), "Merge failed");
        VideoError::MergeFailed(Box::new(cause))
    }
}

/// Write `stream` to `path`, reading at most `limit + 1` bytes.
/// Returns the number of bytes written; anything above `limit` means the
/// stream was larger than allowed.
async fn stream_to_file<S, E>(path: &Path, stream: S, limit: u64) -> Result<u64, VideoError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(std::io::Error::other);
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    let written = tokio::io::copy(&mut body_reader.take(limit + 1), &mut file).await?;
    file.flush().await?;
    Ok(written)
}
