// Config and data: %APPDATA%/NoxX

use std::env;
use std::path::PathBuf;

fn roaming() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join("NoxX")
}

pub fn get_config_dir() -> PathBuf {
    roaming()
}

pub fn get_data_dir() -> PathBuf {
    roaming()
}
