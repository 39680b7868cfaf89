use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::store::schema::{EXPORT_VERSION, ExportData, ProfileSnapshotData, ProgressData};

const PROGRESS_FILE: &str = "progress.json";
const PROFILE_FILE: &str = "adaptive_profile.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matchling");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing or unreadable files load as defaults; a child's save data
    /// should never block the game from starting.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_progress(&self) -> ProgressData {
        self.load(PROGRESS_FILE)
    }

    pub fn save_progress(&self, data: &ProgressData) -> Result<()> {
        self.save(PROGRESS_FILE, data)
    }

    pub fn load_profile_snapshot(&self) -> ProfileSnapshotData {
        self.load(PROFILE_FILE)
    }

    pub fn save_profile_snapshot(&self, data: &ProfileSnapshotData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            matchling_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            progress: self.load_progress(),
            adaptive_profile: self.load_profile_snapshot(),
        }
    }

    /// Two-phase import: stage both files as .tmp, then commit by rename
    /// with a .bak of any original for rollback.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.matchling_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.matchling_export_version,
                EXPORT_VERSION
            );
        }

        let files: Vec<(&str, String)> = vec![
            (PROGRESS_FILE, serde_json::to_string_pretty(&data.progress)?),
            (
                PROFILE_FILE,
                serde_json::to_string_pretty(&data.adaptive_profile)?,
            ),
        ];

        // Stage phase.
        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            match fs::write(&tmp_path, json) {
                Ok(()) => staged.push(tmp_path),
                Err(e) => {
                    for tmp in &staged {
                        let _ = fs::remove_file(tmp);
                    }
                    bail!("Import failed during staging: {e}");
                }
            }
        }

        // Commit phase.
        let mut backups: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let final_path = self.file_path(name);
            let bak_path = self.file_path(name).with_extension("json.bak");
            let had_original = final_path.exists();

            let commit = (|| -> std::io::Result<()> {
                if had_original {
                    fs::rename(&final_path, &bak_path)?;
                }
                fs::rename(&staged[i], &final_path)
            })();

            if let Err(e) = commit {
                // Roll back whatever already moved.
                if had_original && bak_path.exists() && !final_path.exists() {
                    let _ = fs::rename(&bak_path, &final_path);
                }
                for (committed_final, committed_bak, committed_had) in &backups {
                    if *committed_had {
                        let _ = fs::rename(committed_bak, committed_final);
                    } else {
                        let _ = fs::remove_file(committed_final);
                    }
                }
                for tmp in &staged[i..] {
                    let _ = fs::remove_file(tmp);
                }
                bail!("Import failed during commit: {e}");
            }

            backups.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &backups {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }

        Ok(())
    }
}
