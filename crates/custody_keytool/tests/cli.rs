use assert_cmd::Command;
use std::path::Path;

fn keytool(config: &Path, sub: &str) -> Command {
    let mut cmd = Command::cargo_bin("custody-keytool").unwrap();
    cmd.env_remove("CUSTODY_KEYTOOL_CONFIG")
        .arg("--config")
        .arg(config)
        .arg(sub);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out).to_string()
}

#[test]
fn init_generate_retrieve() {
    let tmpdir = tempdir::TempDir::new("custody_keytool_cli").unwrap();
    let config = tmpdir.path().join("keytool-config.yaml");

    keytool(&config, "init").assert().success();
    assert!(config.is_file());
    let yaml = std::fs::read_to_string(&config).unwrap();
    assert!(yaml.contains("prodDir"));
    keytool(&config, "init").assert().failure();

    let out = stdout_of(&mut keytool(&config, "generate"));
    assert!(out.contains("DONE"), "{out}");
    assert!(tmpdir.path().join("product/site-a/root/main/mnemonic.txt").is_file());
    assert!(tmpdir.path().join("open/root/main/seed.txt.json").is_file());
    assert!(tmpdir
        .path()
        .join("product/public/address/main/eth/000/000/00000009.json")
        .is_file());
    keytool(&config, "generate").assert().failure();

    let out = stdout_of(&mut keytool(&config, "retrieve"));
    assert!(out.contains("DONE"), "{out}");
    let log = std::fs::read_to_string(tmpdir.path().join("retrieve.log")).unwrap();
    assert!(log.contains("VERIFY\tmain#[mnemonic,seed]\tOK"), "{log}");
    assert!(!log.contains("ERROR"), "{log}");
    let phrase = std::fs::read_to_string(
        tmpdir.path().join("retrieved/root/main/mnemonic.txt"),
    )
    .unwrap();
    assert_eq!(12, phrase.split(' ').count());

    // the export dir now exists
    keytool(&config, "retrieve").assert().failure();
}

#[test]
fn missing_config_fails() {
    let tmpdir = tempdir::TempDir::new("custody_keytool_cli").unwrap();
    let config = tmpdir.path().join("nope.yaml");
    keytool(&config, "retrieve").assert().failure();
}
