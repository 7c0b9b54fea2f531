use std::path::Path;
use tempfile::TempDir;
use wallet_dash::domain::model::LimitProfile;
use wallet_dash::{
    CliConfig, Dashboard, DashboardEngine, DashboardPipeline, LocalStorage, TomlConfig,
    WalletError,
};

const HEADER: &str = "idx,transaction_id,user_id,transaction_date,product_category,product_name,merchant_name,product_amount,transaction_fee,cashback,loyalty_points,payment_method,transaction_status,merchant_id,device_type,location";

fn write_sample_csv(dir: &Path, rows: usize) -> String {
    let categories = ["Groceries", "Streaming Service", "Food Delivery", "Gaming Credits"];
    let merchants = [
        "Amazon", "Swiggy", "Netflix", "Zomato", "Steam", "Uber", "Flipkart", "BigBasket",
        "Spotify", "Ola", "Myntra", "PhonePe",
    ];
    let payments = ["UPI", "Debit Card", "Credit Card", "Wallet Balance", "Net Banking"];
    let devices = ["Android", "iOS", "Web Browser"];
    let locations = ["Urban", "Suburban", "Rural"];

    let mut lines = vec![HEADER.to_string()];
    for i in 0..rows {
        lines.push(format!(
            "{idx},TXN{idx:05},USER_{user:02},2023-08-{day:02} 10:15:00,{category},Item {idx},{merchant},{amount:.2},{fee:.2},{cashback:.2},{points},{payment},Successful,MERCH_{m:03},{device},{location}",
            idx = i,
            user = i % 17,
            day = 1 + i % 28,
            category = categories[i % categories.len()],
            merchant = merchants[(i * 7) % merchants.len()],
            amount = 5.0 + (i * 37 % 500) as f64,
            fee = (i % 9) as f64 * 0.5,
            cashback = (i % 4) as f64,
            points = i * 3 % 250,
            payment = payments[i % payments.len()],
            m = (i * 7) % merchants.len(),
            device = devices[(i / 2) % devices.len()],
            location = locations[(i / 3) % locations.len()],
        ));
    }

    let path = dir.join("digital_wallet_transactions.csv");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path.to_str().unwrap().to_string()
}

fn cli_config(input: String, output_path: String) -> CliConfig {
    CliConfig {
        input,
        output_path,
        output_file: "dashboard.json".to_string(),
        profile: LimitProfile::Unlimited,
        combined_limit: None,
        limit_scope: None,
        drop_columns: vec!["idx".to_string()],
        parallel: false,
        pretty: false,
        config: None,
        json_logs: false,
        verbose: false,
    }
}

fn read_dashboard(path: &str) -> Dashboard {
    let data = std::fs::read(path).unwrap();
    serde_json::from_slice(&data).unwrap()
}

#[tokio::test]
async fn test_end_to_end_dashboard_build() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path(), 120);
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let pipeline = DashboardPipeline::new(LocalStorage::new("."), cli_config(input, output_path));
    let output_file = DashboardEngine::new(pipeline).run().await.unwrap();

    assert!(output_file.ends_with("dashboard.json"));
    let dashboard = read_dashboard(&output_file);

    assert_eq!(dashboard.heading, "Digital Wallet Transactions Dashboard");
    assert_eq!(dashboard.panels.len(), 6);

    // Top merchants is always capped at ten, even with the unlimited profile
    let merchants = &dashboard.panels[3];
    assert_eq!(merchants.tab_label, "Merchant Popularity");
    assert_eq!(merchants.series[0].x.len(), 10);

    // One series per device type, colours from the device palette
    let devices = &dashboard.panels[2];
    let colors: Vec<&str> = devices.series.iter().map(|s| s.color.as_str()).collect();
    assert_eq!(colors, vec!["orange", "blue", "purple"]);

    // Descending average amount per location
    let averages = &dashboard.panels[0].series[0].y;
    assert!(averages.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_pipeline_output_is_byte_identical_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path(), 80);

    let mut outputs = Vec::new();
    for (run, parallel) in [("first", false), ("second", true)] {
        let output_path = temp_dir.path().join(run).to_str().unwrap().to_string();
        let mut config = cli_config(input.clone(), output_path);
        config.parallel = parallel;
        let pipeline = DashboardPipeline::new(LocalStorage::new("."), config);
        let output_file = DashboardEngine::new(pipeline).run().await.unwrap();
        outputs.push(std::fs::read(output_file).unwrap());
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_top_ten_profile_caps_every_panel() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path(), 150);
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();
    let mut config = cli_config(input, output_path);
    config.profile = LimitProfile::TopTen;

    let pipeline = DashboardPipeline::new(LocalStorage::new("."), config);
    let output_file = DashboardEngine::new(pipeline).run().await.unwrap();
    let dashboard = read_dashboard(&output_file);

    for panel in &dashboard.panels {
        let points: usize = panel.series.iter().map(|s| s.x.len()).sum();
        assert!(points <= 10, "{} has {} points", panel.tab_label, points);
    }
}

#[tokio::test]
async fn test_toml_config_drives_the_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path(), 60);
    let output_path = temp_dir.path().join("toml-out");

    let toml_content = format!(
        r#"
[dashboard]
heading = "Wallet Insights"

[input]
path = "{}"

[output]
path = "{}"
file = "wallet.json"
pretty = true

[execution]
parallel = true

[queries.payment_method_by_location]
limit = 1
scope = "per-group"

[palette]
categorical = ["black"]
"#,
        input,
        output_path.to_str().unwrap()
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let pipeline = DashboardPipeline::new(LocalStorage::new("."), config);
    let output_file = DashboardEngine::new(pipeline).run().await.unwrap();
    let dashboard = read_dashboard(&output_file);

    assert!(output_file.ends_with("wallet.json"));
    assert_eq!(dashboard.heading, "Wallet Insights");

    // 每個地區只保留一種付款方式
    let payments = &dashboard.panels[4];
    let mut locations: Vec<&String> = payments.series.iter().flat_map(|s| s.x.iter()).collect();
    locations.sort();
    assert_eq!(locations, vec!["Rural", "Suburban", "Urban"]);
    assert!(payments.series.iter().all(|s| s.color == "black"));
}

#[tokio::test]
async fn test_missing_column_aborts_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.csv");
    std::fs::write(
        &input,
        "transaction_id,user_id,location\nT1,USER_01,Urban\n",
    )
    .unwrap();
    let output_path = temp_dir.path().join("out");

    let config = cli_config(
        input.to_str().unwrap().to_string(),
        output_path.to_str().unwrap().to_string(),
    );
    let pipeline = DashboardPipeline::new(LocalStorage::new("."), config);
    let result = DashboardEngine::new(pipeline).run().await;

    assert!(matches!(result, Err(WalletError::SchemaError { row: 1, .. })));
    assert!(!output_path.join("dashboard.json").exists());
}
