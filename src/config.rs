use std::ffi::OsString;
use std::path::PathBuf;

/// Dataset opened when no path is given on the command line.
pub const DEFAULT_DATA_PATH: &str = "student-mat.csv";

/// Startup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window_size: [1280.0, 860.0],
            min_window_size: [720.0, 480.0],
        }
    }
}

impl DashboardConfig {
    /// Build from process arguments (program name included). The first
    /// positional argument, if any, overrides the dataset path.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().nth(1) {
            config.data_path = PathBuf::from(path);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn defaults_to_the_fixed_dataset() {
        let config = DashboardConfig::from_args(args(&["student-dash"]));
        assert_eq!(config.data_path, PathBuf::from("student-mat.csv"));
    }

    #[test]
    fn first_argument_overrides_the_path() {
        let config = DashboardConfig::from_args(args(&["student-dash", "/data/student-por.csv"]));
        assert_eq!(config.data_path, PathBuf::from("/data/student-por.csv"));
    }
}
