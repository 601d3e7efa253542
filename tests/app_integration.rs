use std::fs;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const LATEST: &str = "/api/latest";

    pub async fn create_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(LATEST))
            .and(query_param("access_key", "integration-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(api_key: &str, base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
        provider:
          base_url: "{base_url}"
          api_key: "{api_key}"
        source: "USD"
        target: "EUR"
    "#
        );
        super::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

const RATES: &str = r#"{
    "success": true,
    "base": "EUR",
    "date": "2024-03-15",
    "rates": {"EUR": 1, "USD": 1.25, "GBP": 0.85}
}"#;

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(200, RATES).await;
    let base_url = format!("{}{}", mock_server.uri(), test_utils::LATEST);
    let config_file = test_utils::write_config("integration-key", &base_url);

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: None,
            to: Some("gbp".to_string()),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_result_through_provider() {
    use fxconv::cli::convert;
    use fxconv::config::ProviderConfig;
    use fxconv::core::ConversionRequest;
    use fxconv::providers::FixerProvider;
    use std::sync::Arc;

    let mock_server = test_utils::create_mock_server(200, RATES).await;
    let provider = FixerProvider::new(ProviderConfig {
        base_url: format!("{}{}", mock_server.uri(), test_utils::LATEST),
        api_key: Some("integration-key".to_string()),
        ..ProviderConfig::default()
    })
    .unwrap();

    let request = ConversionRequest {
        amount: "100".to_string(),
        source: "USD".to_string(),
        target: "EUR".to_string(),
    };
    let result = convert::run(Arc::new(provider), request).await.unwrap();
    info!(%result, "Converted through mock provider");

    assert_eq!(result.converted_display(), "80.00");
    assert_eq!(result.to_string(), "100 USD = 80.00 EUR");
}

#[test_log::test(tokio::test)]
async fn test_currencies_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(200, RATES).await;
    let base_url = format!("{}{}", mock_server.uri(), test_utils::LATEST);
    let config_file = test_utils::write_config("integration-key", &base_url);

    let result = fxconv::run_command(
        fxconv::AppCommand::Currencies { from: None },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Currencies command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_amount_is_reported() {
    let mock_server = test_utils::create_mock_server(200, RATES).await;
    let base_url = format!("{}{}", mock_server.uri(), test_utils::LATEST);
    let config_file = test_utils::write_config("integration-key", &base_url);

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "abc".to_string(),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid input. Please enter a valid amount."
    );
}

#[test_log::test(tokio::test)]
async fn test_server_error_is_reported_generically() {
    let mock_server = test_utils::create_mock_server(503, "").await;
    let base_url = format!("{}{}", mock_server.uri(), test_utils::LATEST);
    let config_file = test_utils::write_config("integration-key", &base_url);

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Failed to fetch currency data."
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_api_key_skips_network() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RATES))
        .expect(0)
        .mount(&mock_server)
        .await;
    let base_url = format!("{}{}", mock_server.uri(), test_utils::LATEST);
    let config_file = test_utils::write_config("", &base_url);

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .starts_with("Missing API configuration")
    );
}
