//! Fixture catalog contents

#![allow(dead_code)]

pub const GAME_PACKAGE: &str = "com.example.game";
pub const GAME_NAME: &str = "Space Game";
pub const TOOL_PACKAGE: &str = "com.example.tool";
pub const BROKEN_PACKAGE: &str = "com.example.broken";
pub const FTP_PACKAGE: &str = "com.example.ftp";

pub const CATALOG_PATH: &str = "/apps.json";
pub const EMPTY_CATALOG_PATH: &str = "/empty.json";
pub const BLANK_CATALOG_PATH: &str = "/blank.json";
pub const BROKEN_CATALOG_PATH: &str = "/broken.json";
pub const ERROR_CATALOG_PATH: &str = "/error.json";

pub const ARTIFACT_SIZE: usize = 256 * 1024;

/// Deterministic artifact payload served for every package.
pub fn artifact_bytes() -> Vec<u8> {
    (0..ARTIFACT_SIZE).map(|i| (i % 251) as u8).collect()
}
