use std::path::PathBuf;

pub fn to_refresh_path(mut path: PathBuf) -> PathBuf {
    path.set_file_name("habitwall-refresh");
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }
    path
}
