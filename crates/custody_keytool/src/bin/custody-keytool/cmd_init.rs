use super::*;
use std::io::Write;

pub(crate) fn exec(config_path: &Path) -> CustodyResult<()> {
    if std::fs::metadata(config_path).is_ok() {
        return Err(format!(
            "{config_path:?} already exists - refusing to overwrite existing config"
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let config = KeyToolConfigInner::example();

    let mut config_f = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(config_path)?;
    config_f.write_all(config.to_string().as_bytes())?;
    config_f.flush()?;
    drop(config_f);

    println!("# custody-keytool init config:\n{config_path:?}");

    Ok(())
}
