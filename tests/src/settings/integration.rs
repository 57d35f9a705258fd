use netroute_common::network::target::{ConfigurationRun, Target};
use netroute_common::settings::{DEFAULT_INTERFACE, Defaults, Settings, SettingsStore};

#[test]
fn edits_survive_a_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("nested").join("settings.json"));

    let mut settings = store.load();
    assert_eq!(settings.default_interface, DEFAULT_INTERFACE);
    settings.add_hostname("a.example");
    settings.add_address("10.0.0.5");
    settings.replace_hostnames_from_text("b.example\n\n a.example \nb.example\n");
    settings.set_default_interface("10.0.0.1");
    store.save(&settings).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded, settings);
    assert_eq!(reloaded.hostnames, vec!["b.example", "a.example"]);
}

#[test]
fn reloaded_settings_plan_the_same_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::new(dir.path().join("settings.json"));
    let settings = Settings {
        default_interface: "192.168.1.10".to_string(),
        hostnames: vec!["x.com".to_string()],
        addresses: vec!["8.8.8.8".to_string()],
    };
    store.save(&settings).unwrap();

    let run = ConfigurationRun::from_settings(&store.load());
    assert_eq!(run.targets(), &[Target::hostname("x.com"), Target::address("8.8.8.8")]);
}

#[test]
fn builtin_lists_are_merged_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"DefaultInterface":"10.0.0.1","Urls":null,"IPs":["10.0.0.9"]}"#)
        .unwrap();

    let defaults = Defaults {
        interface: DEFAULT_INTERFACE.to_string(),
        hostnames: vec!["update.example".to_string()],
        addresses: vec!["10.0.0.9".to_string(), "10.0.0.10".to_string()],
    };
    let loaded = SettingsStore::new(&path).with_defaults(defaults).load();

    assert_eq!(loaded.default_interface, "10.0.0.1");
    assert_eq!(loaded.hostnames, vec!["update.example"]);
    assert_eq!(loaded.addresses, vec!["10.0.0.9", "10.0.0.10"]);
}
