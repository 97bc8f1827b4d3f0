use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration for the portal
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory where uploaded files are stored (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory the analysis script deposits its reports in
    /// (default: "targets/all")
    pub output_dir: PathBuf,

    /// Executable invoked with the uploaded file path as its sole
    /// argument (default: "auto3.sh")
    pub script_path: PathBuf,

    /// Maximum accepted upload body in bytes (default: 256 MB)
    pub max_upload_size: usize,

    /// Address the HTTP server binds to (default: 127.0.0.1:3000)
    pub listen_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("targets/all"),
            script_path: PathBuf::from("auto3.sh"),
            max_upload_size: 256 * 1024 * 1024, // 256 MB
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),

            script_path: env::var("SCRIPT_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.script_path),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            listen_addr: format!("{host}:{port}")
                .parse()
                .unwrap_or(default.listen_addr),
        }
    }
}
