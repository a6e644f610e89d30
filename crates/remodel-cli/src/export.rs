//! Reading input photos and writing session output to disk

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use jiff::Zoned;
use log::debug;
use remodel_core::{AudioClip, Image, Plan, VideoClip};

/// Reads a photo and tags it with the MIME type implied by its extension.
pub fn load_image(path: &Path) -> Result<Image> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        other => bail!(
            "Unsupported image type '{other}' for {} (expected jpg, png or webp)",
            path.display()
        ),
    };
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(Image::from_bytes(mime_type, &bytes))
}

/// Loads a plan previously written by [`Exporter::write_plan`].
pub fn load_plan(path: &Path) -> Result<Plan> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let plan: Plan = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a valid plan", path.display()))?;
    plan.validated()
        .with_context(|| format!("{} is not a valid plan", path.display()))
}

/// Fresh timestamped directory under $XDG_DATA_HOME/remodel.
pub fn default_output_dir() -> Result<PathBuf> {
    let stamp = Zoned::now().strftime("%Y%m%d-%H%M%S").to_string();
    xdg::BaseDirectories::with_prefix("remodel")
        .create_data_directory(&stamp)
        .context("Failed to create output directory under XDG data home")
}

/// Lowercase, dash-separated file stem for a display name.
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Writes session output into one directory and remembers what it wrote.
pub struct Exporter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl Exporter {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn write_plan(&mut self, plan: &Plan) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(plan).context("Failed to serialize plan")?;
        self.write("plan.json", json.as_bytes())
    }

    pub fn write_image(&mut self, stem: &str, image: &Image) -> Result<PathBuf> {
        let bytes = image
            .decode()
            .with_context(|| format!("Failed to decode image {stem}"))?;
        self.write(&format!("{stem}.{}", image.extension()), &bytes)
    }

    pub fn write_audio(&mut self, stem: &str, clip: &AudioClip) -> Result<PathBuf> {
        self.write(&format!("{stem}.wav"), &clip.to_wav())
    }

    pub fn write_video(&mut self, stem: &str, clip: &VideoClip) -> Result<PathBuf> {
        let extension = match clip.mime_type.as_str() {
            "video/webm" => "webm",
            _ => "mp4",
        };
        self.write(&format!("{stem}.{extension}"), &clip.bytes)
    }

    fn write(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        self.written.push(path.clone());
        Ok(path)
    }
}
