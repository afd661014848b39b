use anyhow::Result;
use serde::Serialize;

use stitch_lib::consts::{APP_NAME, BACKUP_SUFFIX};
use stitch_lib::platform::{Os, platform_description};
use stitch_lib::{LogLevel, RebuildConfig, Rustc};

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Debug, Serialize)]
struct Info {
  version: &'static str,
  platform: String,
  exe_suffix: &'static str,
  compiler: String,
  backup_suffix: &'static str,
  delete_backup: bool,
  log_level: &'static str,
}

pub fn cmd_info(log_level: LogLevel, format: OutputFormat) -> Result<bool> {
  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    platform: platform_description(),
    exe_suffix: Os::current().map(|os| os.exe_suffix()).unwrap_or(""),
    compiler: Rustc::from_env().program().display().to_string(),
    backup_suffix: BACKUP_SUFFIX,
    delete_backup: RebuildConfig::from_env().delete_backup,
    log_level: log_level.as_str(),
  };

  if format.is_json() {
    print_json(&info)?;
    return Ok(true);
  }

  println!("{} v{}", APP_NAME, info.version);
  print_stat("Platform", &info.platform);
  print_stat("Executable suffix", if info.exe_suffix.is_empty() { "(none)" } else { info.exe_suffix });
  print_stat("Compiler", &info.compiler);
  print_stat("Backup suffix", info.backup_suffix);
  print_stat("Delete backup", &info.delete_backup.to_string());
  print_stat("Log level", info.log_level);

  Ok(true)
}
