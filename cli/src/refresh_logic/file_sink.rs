//! Writes every delivered payload to `<out_dir>/<resource_id>.dat`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lib_refresh::{DataStream, Subscriber};

#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn path_for(&self, resource_id: &str) -> PathBuf {
        self.out_dir.join(format!("{}.dat", resource_id))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl Subscriber for FileSink {
    fn on_new_data(&self, resource_id: &str, mut data: DataStream) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let path = self.path_for(resource_id);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let bytes = io::copy(&mut data, &mut writer)
            .with_context(|| format!("writing {}", path.display()))?;
        writer.flush()?;

        log::debug!("Wrote {} bytes to {}", bytes, path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file-sink"
    }
}
