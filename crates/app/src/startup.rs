use std::path::PathBuf;

use crate::Result;

const DB_FILE_NAME: &str = "cmg-monitor.sqlite";
const SPOOL_DIR_NAME: &str = "spool";

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub app_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub spool_dir: PathBuf,
}

impl AppPaths {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let db_path = app_data_dir.join(DB_FILE_NAME);
        let spool_dir = app_data_dir.join(SPOOL_DIR_NAME);
        Self {
            app_data_dir,
            db_path,
            spool_dir,
        }
    }

    /// Uses `spool_dir` instead of the default folder under the data dir.
    pub fn with_spool_dir(mut self, spool_dir: Option<PathBuf>) -> Self {
        if let Some(spool_dir) = spool_dir {
            self.spool_dir = spool_dir;
        }
        self
    }
}

pub fn ensure_app_data_dir(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.app_data_dir)?;
    std::fs::create_dir_all(&paths.spool_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spool_override_keeps_db_location() {
        let paths = AppPaths::new(PathBuf::from("/var/lib/cmg"))
            .with_spool_dir(Some(PathBuf::from("/srv/screener")));
        assert_eq!(paths.db_path, PathBuf::from("/var/lib/cmg/cmg-monitor.sqlite"));
        assert_eq!(paths.spool_dir, PathBuf::from("/srv/screener"));
    }
}
