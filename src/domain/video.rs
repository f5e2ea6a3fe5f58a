use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted metadata for one stored video blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoRecord {
    pub id: Uuid,
    /// Display name, extension included
    pub filename: String,
    /// Storage key of the blob
    pub path: String,
    /// Seconds
    pub duration: f64,
    /// Megabytes
    pub size: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub filename: String,
    pub path: String,
    pub duration: f64,
    pub size: f64,
}

/// Fields a trim-in-place may change. `path: None` keeps the current key.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpdate {
    pub duration: f64,
    pub size: f64,
    pub path: Option<String>,
}

/// Which end of the video the trim point is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimAnchor {
    Start,
    End,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrimRequest {
    pub video_id: Uuid,
    pub trim_time: f64,
    pub trim_type: TrimAnchor,
    #[serde(default)]
    pub save_as_new: bool,
}

impl TrimRequest {
    /// Interval kept by this trim for a video of `duration` seconds.
    ///
    /// `start` keeps `[trim_time, duration]`, `end` keeps `[0, trim_time]`.
    pub fn interval(&self, duration: f64) -> TrimInterval {
        match self.trim_type {
            TrimAnchor::Start => TrimInterval {
                start: self.trim_time,
                end: duration,
            },
            TrimAnchor::End => TrimInterval {
                start: 0.0,
                end: self.trim_time,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimInterval {
    pub start: f64,
    pub end: f64,
}

impl TrimInterval {
    /// `0 < start < end`
    pub fn is_valid(&self) -> bool {
        0.0 < self.start && self.start < self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of a trim: the record that now holds the trimmed media.
#[derive(Debug, Clone, PartialEq)]
pub enum TrimOutcome {
    Updated(VideoRecord),
    Copied(VideoRecord),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub video_ids: Vec<Uuid>,
    pub output_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedVideo {
    pub new_video_id: Uuid,
    pub filename: String,
    pub duration: f64,
    pub size: f64,
}

impl From<VideoRecord> for MergedVideo {
    fn from(record: VideoRecord) -> Self {
        Self {
            new_video_id: record.id,
            filename: record.filename,
            duration: record.duration,
            size: record.size,
        }
    }
}

fn default_expiry_hours() -> f64 {
    24.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub video_id: Uuid,
    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareLink {
    pub share_link: String,
    pub expiry_time: DateTime<Utc>,
    pub video_id: Uuid,
    pub video_name: String,
}
