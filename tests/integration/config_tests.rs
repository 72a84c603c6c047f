use dupefinder::cli::{Cli, Commands};
use dupefinder::config::Config;
use clap::Parser;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
recursive = false
min_size = 4096
extensions = [".JPG", "png"]
io_threads = 8
paranoid = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert!(!config.recursive);
    assert_eq!(config.min_size, 4096);
    assert_eq!(config.io_threads, 8);
    assert!(config.paranoid);

    let finder = config.finder_config();
    assert!(!finder.walker_config.recursive);
    assert!(finder.walker_config.extensions.contains(".jpg"));
    assert!(finder.walker_config.extensions.contains(".png"));
}

#[test]
fn test_config_invalid_toml_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = \"big\"").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_config_env_layer_beats_file() {
    // Env vars are process-global; figment::Jail keeps them scoped
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "io_threads = 2\nmin_size = 10")?;
        jail.set_env("DUPEFINDER_IO_THREADS", "6");

        let config = Config::load(Some(std::path::Path::new("config.toml")))
            .map_err(|e| e.to_string())?;
        assert_eq!(config.io_threads, 6);
        assert_eq!(config.min_size, 10);
        Ok(())
    });
}

#[test]
fn test_cli_flags_beat_config() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = 10\nio_threads = 2\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupefinder",
        "--config",
        config_path.to_str().unwrap(),
        "scan",
        "/data",
        "--min-size",
        "1KiB",
        "--no-recursive",
    ])
    .unwrap();

    let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(cli.config.as_ref().unwrap()))
        .extract()
        .unwrap();
    let Commands::Scan(args) = cli.command;
    args.apply_to(&mut config);

    assert_eq!(config.min_size, 1024);
    assert_eq!(config.io_threads, 2);
    assert!(!config.recursive);
}
