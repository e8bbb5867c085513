use anyhow::Result;
use tokio::sync::watch;

use anvil_lib::game::instance::resolver::canonical_path;
use anvil_lib::game::instance::{keys, Instance, MemorySettings, SettingValue, SettingsStore};
use anvil_lib::game::launcher::{AuthSession, CancelToken};

const DESCRIPTOR: &str = r#"{
    "id": "1.6.4",
    "mainClass": "net.minecraft.client.main.Main",
    "minecraftArguments": "--username ${auth_player_name} --session ${auth_session} --version ${version_name} --gameDir ${game_directory} --assetsDir ${game_assets}",
    "assets": "legacy",
    "libraries": [
        { "name": "net.sf.jopt-simple:jopt-simple:4.5" },
        {
            "name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.0",
            "natives": { "linux": "natives-linux", "windows": "natives-windows-${arch}", "osx": "natives-osx" }
        }
    ]
}"#;

const ASSET_INDEX: &str = r#"{
    "virtual": true,
    "objects": { "sounds/random/click.ogg": { "hash": "ab12cd34", "size": 5 } }
}"#;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Lay out a throwaway launcher data dir and instance
    let tmp = tempfile::tempdir()?;
    let data_dir = tmp.path().join("data");
    let instance_root = tmp.path().join("instances").join("demo");

    std::fs::create_dir_all(&instance_root)?;
    std::fs::write(canonical_path(&instance_root), DESCRIPTOR)?;

    let assets_dir = data_dir.join("assets");
    std::fs::create_dir_all(assets_dir.join("indexes"))?;
    std::fs::write(assets_dir.join("indexes").join("legacy.json"), ASSET_INDEX)?;
    std::fs::create_dir_all(assets_dir.join("objects").join("ab"))?;
    std::fs::write(assets_dir.join("objects").join("ab").join("ab12cd34"), b"click")?;

    let mut settings = MemorySettings::new();
    settings.set(keys::INTENDED_VERSION, SettingValue::from("1.6.4"));
    let mut instance = Instance::new(&instance_root, "Demo", &data_dir, Box::new(settings));

    // Launch from an editable copy of the descriptor
    instance.customize_version()?;
    println!("{}", instance.status_description());

    let session = AuthSession {
        username: "demo".to_string(),
        session_token: "token:0:0".to_string(),
        access_token: "0".to_string(),
        player_name: "Demo".to_string(),
        uuid: "00000000-0000-0000-0000-000000000000".to_string(),
        user_type: "legacy".to_string(),
        serialized_user_properties: "{}".to_string(),
    };

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let script = instance
        .prepare_for_launch(&session, &CancelToken::new(cancel_rx))
        .await?;

    print!("{}", script);

    instance.revert_custom_version()?;
    instance.cleanup_after_run().await?;

    Ok(())
}
