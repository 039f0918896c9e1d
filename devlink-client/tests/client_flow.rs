use std::sync::Arc;

use devlink_client::identity::{
    CLIENT_ID_KEY, ClientId, IdentityStore, JsonFileStore, PlatformConstants, PlatformOs,
    ScreenDimensions, StaticPlatform,
};
use devlink_client::plugins::{EditorRequests, OverlayState, names};
use devlink_client::{
    ClientConfig, ClientOverrides, DefaultPluginOptions, DevClient, Frame, channel_transport,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedReceiver;

fn android_emulator() -> Arc<StaticPlatform> {
    Arc::new(
        StaticPlatform::new(
            PlatformConstants {
                os: PlatformOs::Android,
                os_version: Some("34".into()),
                model: Some("sdk_gphone64".into()),
                ..PlatformConstants::default()
            },
            ScreenDimensions::uniform(411.0, 914.0, 2.625),
        )
        .with_script_url("http://10.0.2.2:8081/index.bundle?platform=android&dev=true"),
    )
}

fn drain(rx: &mut UnboundedReceiver<Frame>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let Frame::Text(text) = frame {
            frames.push(serde_json::from_str(&text).unwrap());
        }
    }
    frames
}

#[tokio::test]
async fn test_full_session_with_defaults() {
    let platform = android_emulator();
    let (factory, mut rx) = channel_transport();
    let overrides = ClientOverrides::from_toml_str("name = \"Checkout\"").unwrap();
    let config = ClientConfig::from_platform(platform.as_ref(), overrides).with_socket_factory(factory);
    assert_eq!(config.host, "10.0.2.2");

    let client = DevClient::new(config, platform);
    client
        .use_defaults(DefaultPluginOptions {
            storybook: false.into(),
            ..DefaultPluginOptions::default()
        })
        .unwrap();
    assert_eq!(client.plugin_names().len(), 7);

    // Sent before the socket exists, so it waits behind the intro.
    client
        .call("log", &[json!("booting")])
        .unwrap();

    client.connect().await.unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        Frame::Open("ws://10.0.2.2:9090".into())
    );
    let frames = drain(&mut rx);
    assert_eq!(frames[0]["type"], "client.intro");
    assert_eq!(
        frames[0]["payload"]["clientId"],
        "Checkout-android-34-sdk_gphone64-411-914-2.625"
    );
    assert_eq!(frames[1]["type"], "log");

    client
        .call(
            "reportRequest",
            &[json!({
                "request": {"url": "https://api.example.com/cart", "method": "POST"},
                "response": {"status": 201, "headers": {"content-type": "application/json"}}
            })],
        )
        .unwrap();
    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "api.response");

    client
        .receive(r#"{"type":"editor.open","payload":{"file":"src/Cart.tsx","lineNumber":40}}"#)
        .await
        .unwrap();
    client
        .receive(r#"{"type":"overlay","payload":{"uri":"data:image/png;base64,AAAA"}}"#)
        .await
        .unwrap();

    let requests = client.extension::<EditorRequests>().unwrap().take();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].endpoint, "http://localhost:8081/open-stack-frame");
    assert_eq!(requests[0].line_number, Some(40));
    assert!(client.extension::<OverlayState>().unwrap().current().is_some());

    client.disconnect().unwrap();
    assert!(client.extension::<OverlayState>().unwrap().current().is_none());
    client.shutdown();
    assert!(!client.plugin_names().iter().any(|n| n == names::STORYBOOK));
}

#[tokio::test]
async fn test_server_assigned_id_persists_in_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileStore::new(dir.path().join("devlink/identity.json")));

    let platform = android_emulator();
    let client = DevClient::new(
        ClientConfig::from_platform(platform.as_ref(), ClientOverrides::default()),
        platform,
    );
    client.set_identity_store(store.clone());
    assert_eq!(client.get_client_id().await.unwrap(), None);

    client
        .receive(r#"{"type":"setClientId","payload":"c7f1"}"#)
        .await
        .unwrap();
    assert_eq!(
        store.get_item(CLIENT_ID_KEY).await.unwrap(),
        Some("c7f1".to_string())
    );

    let reopened = JsonFileStore::new(dir.path().join("devlink/identity.json"));
    assert_eq!(
        reopened.get_item(CLIENT_ID_KEY).await.unwrap(),
        Some("c7f1".to_string())
    );
    assert_eq!(
        client.get_client_id().await.unwrap(),
        Some(ClientId::from("c7f1"))
    );
}
