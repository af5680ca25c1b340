mod helpers;

use helpers::{rgb_batch, ScriptedTransport};
use mockito::Matcher;
use remote_saver_client::{TransportError, Uploader};
use remote_saver_core::{ConfigurationError, ImageFormat, RawImage, UploadConfig, UploadStatus};
use remote_saver_processing::decode_bytes;
use serde_json::json;
use std::sync::Arc;

fn scripted_uploader(transport: &ScriptedTransport) -> Uploader {
    Uploader::new(Arc::new(transport.clone()))
}

#[tokio::test]
async fn test_one_result_per_image_in_order() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let config = UploadConfig::new("http://uploads.test/upload");

    let results = uploader.upload(&rgb_batch(3), &config).await.unwrap();

    assert_eq!(results.len(), 3);
    let names: Vec<_> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["ComfyUI_1.png", "ComfyUI_2.png", "ComfyUI_3.png"]);
    assert!(results.iter().all(|r| r.is_success()));
    assert!(results.iter().all(|r| r.kind == "remote" && r.subfolder.is_empty()));
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_empty_batch_sends_nothing() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);

    let results = uploader
        .upload(&[], &UploadConfig::new("http://uploads.test/upload"))
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_headers_abort_before_any_request() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let config = UploadConfig {
        headers_json: Some(r#"{"Authorization": "#.to_string()),
        ..UploadConfig::new("http://uploads.test/upload")
    };

    let err = uploader.upload(&rgb_batch(2), &config).await.unwrap_err();

    assert!(matches!(err, ConfigurationError::InvalidHeadersJson(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_extra_data_abort_before_any_request() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let config = UploadConfig {
        extra_data_json: Some("not json".to_string()),
        ..UploadConfig::new("http://uploads.test/upload")
    };

    let err = uploader.upload_for_ui(&rgb_batch(1), &config).await.unwrap_err();

    assert!(matches!(err, ConfigurationError::InvalidExtraDataJson(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_transport_failure_is_isolated_to_its_image() {
    let transport = ScriptedTransport::new()
        .respond(200, r#"{"url": "https://cdn.test/1.png"}"#)
        .fail(TransportError::Connect("connection refused".to_string()))
        .respond(200, r#"{"data": {"url": "https://cdn.test/3.png"}}"#);
    let uploader = scripted_uploader(&transport);

    let results = uploader
        .upload(&rgb_batch(3), &UploadConfig::new("http://uploads.test/upload"))
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, UploadStatus::Success);
    assert_eq!(results[0].url.as_deref(), Some("https://cdn.test/1.png"));

    assert_eq!(results[1].status, UploadStatus::Error);
    assert_eq!(results[1].filename, "ComfyUI_2.png");
    assert_eq!(results[1].url, None);
    assert!(results[1].message.starts_with("Error uploading image 2:"));
    assert!(results[1].message.contains("connection refused"));

    assert_eq!(results[2].status, UploadStatus::Success);
    assert_eq!(results[2].url.as_deref(), Some("https://cdn.test/3.png"));
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_encode_failure_is_isolated_to_its_image() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let images = vec![
        RawImage::new(4, 4, 3, vec![0.5; 5]),
        RawImage::filled(4, 4, &[0.5, 0.5, 0.5]),
    ];

    let results = uploader
        .upload(&images, &UploadConfig::new("http://uploads.test/upload"))
        .await
        .unwrap();

    assert_eq!(results[0].status, UploadStatus::Error);
    assert!(results[0].message.starts_with("Error encoding image 1:"));
    assert_eq!(results[1].status, UploadStatus::Success);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.requests()[0].filename, "ComfyUI_2.png");
}

#[tokio::test]
async fn test_request_carries_configuration() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let config = UploadConfig {
        image_field_name: "image".to_string(),
        filename_prefix: "render".to_string(),
        image_format: ImageFormat::Jpeg,
        headers_json: Some(r#"{"Authorization": "Bearer abc"}"#.to_string()),
        extra_data_json: Some(r#"{"album": "7", "public": true}"#.to_string()),
        quality: 80,
        ..UploadConfig::new("http://uploads.test/upload")
    };

    uploader.upload(&rgb_batch(1), &config).await.unwrap();

    let requests = transport.requests();
    let request = &requests[0];
    assert_eq!(request.url, "http://uploads.test/upload");
    assert_eq!(request.field_name, "image");
    assert_eq!(request.filename, "render_1.jpg");
    assert_eq!(request.mime_type, "image/jpeg");
    assert_eq!(request.headers["authorization"], "Bearer abc");
    assert_eq!(
        request.form_fields,
        vec![
            ("album".to_string(), "7".to_string()),
            ("public".to_string(), "true".to_string()),
        ]
    );
    // JPEG SOI marker
    assert_eq!(&request.data[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_png_payload_decodes_to_input_pixels() {
    let transport = ScriptedTransport::new();
    let uploader = scripted_uploader(&transport);
    let image = RawImage::filled(5, 3, &[1.0, 0.0, 0.5, 1.0]);

    uploader
        .upload(
            std::slice::from_ref(&image),
            &UploadConfig::new("http://uploads.test/upload"),
        )
        .await
        .unwrap();

    let decoded = decode_bytes(&transport.requests()[0].data).unwrap();
    assert_eq!((decoded.width, decoded.height, decoded.channels), (5, 3, 4));
    assert_eq!(&decoded.data[..4], &[1.0, 0.0, 128.0 / 255.0, 1.0]);
}

#[tokio::test]
async fn test_upload_for_ui_envelope() {
    let transport = ScriptedTransport::new().respond(500, "server error");
    let uploader = scripted_uploader(&transport);

    let ui = uploader
        .upload_for_ui(&rgb_batch(1), &UploadConfig::new("http://uploads.test/upload"))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&ui).unwrap(),
        json!({
            "ui": {
                "images": [{
                    "filename": "ComfyUI_1.png",
                    "subfolder": "",
                    "type": "remote",
                    "status": "error",
                    "message": "server error"
                }]
            }
        })
    );
}

#[tokio::test]
async fn test_http_upload_top_level_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_header("authorization", "Bearer abc")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="ComfyUI_1.png""#.to_string()),
            Matcher::Regex(r#"name="source"\r\n\r\nComfyUI"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url": "https://cdn.test/ComfyUI_1.png"}"#)
        .expect(1)
        .create_async()
        .await;

    let config = UploadConfig {
        headers_json: Some(r#"{"Authorization": "Bearer abc"}"#.to_string()),
        extra_data_json: Some(r#"{"source": "ComfyUI"}"#.to_string()),
        ..UploadConfig::new(format!("{}/upload", server.url()))
    };

    let results = Uploader::http()
        .unwrap()
        .upload(&rgb_batch(1), &config)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(results[0].status, UploadStatus::Success);
    assert_eq!(
        results[0].url.as_deref(),
        Some("https://cdn.test/ComfyUI_1.png")
    );
    assert_eq!(
        results[0].message,
        r#"{"url": "https://cdn.test/ComfyUI_1.png"}"#
    );
}

#[tokio::test]
async fn test_http_upload_nested_url_and_custom_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .match_body(Matcher::Regex(
            r#"name="image"; filename="shot_1.webp""#.to_string(),
        ))
        .with_status(201)
        .with_body(r#"{"data": {"url": "https://cdn.test/shot_1.webp"}}"#)
        .create_async()
        .await;

    let config = UploadConfig {
        image_field_name: "image".to_string(),
        filename_prefix: "shot".to_string(),
        image_format: ImageFormat::Webp,
        ..UploadConfig::new(format!("{}/upload", server.url()))
    };

    let results = Uploader::http()
        .unwrap()
        .upload(&rgb_batch(1), &config)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(results[0].status, UploadStatus::Success);
    assert_eq!(
        results[0].url.as_deref(),
        Some("https://cdn.test/shot_1.webp")
    );
}

#[tokio::test]
async fn test_http_upload_without_url_is_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .expect(2)
        .create_async()
        .await;

    let results = Uploader::http()
        .unwrap()
        .upload(
            &rgb_batch(2),
            &UploadConfig::new(format!("{}/upload", server.url())),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    for result in &results {
        assert_eq!(result.status, UploadStatus::Success);
        assert_eq!(result.url, None);
        assert_eq!(result.message, r#"{"status":"ok"}"#);
    }
}

#[tokio::test]
async fn test_http_upload_non_json_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/upload")
        .with_status(200)
        .with_body("stored")
        .create_async()
        .await;

    let results = Uploader::http()
        .unwrap()
        .upload(
            &rgb_batch(1),
            &UploadConfig::new(format!("{}/upload", server.url())),
        )
        .await
        .unwrap();

    assert_eq!(results[0].status, UploadStatus::Success);
    assert_eq!(results[0].url, None);
    assert_eq!(results[0].message, "stored");
}

#[tokio::test]
async fn test_http_upload_server_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/upload")
        .with_status(500)
        .with_body("server error")
        .expect(2)
        .create_async()
        .await;

    let results = Uploader::http()
        .unwrap()
        .upload(
            &rgb_batch(2),
            &UploadConfig::new(format!("{}/upload", server.url())),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 2);
    for result in &results {
        assert_eq!(result.status, UploadStatus::Error);
        assert_eq!(result.message, "server error");
    }
}

#[tokio::test]
async fn test_http_upload_connection_refused() {
    // Nothing listens on port 1
    let config = UploadConfig::new("http://127.0.0.1:1/upload");

    let results = Uploader::http()
        .unwrap()
        .upload(&rgb_batch(2), &config)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, UploadStatus::Error);
    assert!(results[0].message.starts_with("Error uploading image 1:"));
    assert!(results[1].message.starts_with("Error uploading image 2:"));
}

#[tokio::test]
async fn test_http_upload_invalid_url() {
    let results = Uploader::http()
        .unwrap()
        .upload(&rgb_batch(1), &UploadConfig::new("not a url"))
        .await
        .unwrap();

    assert_eq!(results[0].status, UploadStatus::Error);
    assert!(results[0].message.starts_with("Error uploading image 1:"));
}

#[tokio::test]
async fn test_null_top_level_url_skips_nested_lookup() {
    let transport = ScriptedTransport::new()
        .respond(200, r#"{"url": null, "data": {"url": "https://cdn.test/1.png"}}"#);
    let uploader = scripted_uploader(&transport);

    let results = uploader
        .upload(&rgb_batch(1), &UploadConfig::new("http://uploads.test/upload"))
        .await
        .unwrap();

    assert_eq!(results[0].status, UploadStatus::Success);
    assert_eq!(results[0].url, None);
}
