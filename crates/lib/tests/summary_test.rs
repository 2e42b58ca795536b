//! # Vendor Summary Tests
//!
//! Runs the rollups against an ingested fixture dataset and checks the joined
//! result, the cleaning step, the derived ratios and the persisted table.

mod common;

use anyhow::Result;
use common::{assert_close, setup_tracing};
use tempfile::tempdir;
use vendorsum::summary::{clean_data, create_vendor_summary};
use vendorsum::{
    load_raw_data, run_summary, Cell, RatioPolicy, SummaryOptions, Table, VendorSummary,
};
use vendorsum_test_utils::{inventory, write_csv, TestSetup};

async fn ingested_fixture() -> Result<(TestSetup, tempfile::TempDir)> {
    let data_dir = tempdir()?;
    inventory::write_all(data_dir.path())?;
    let setup = TestSetup::new().await?;
    load_raw_data(&setup.store, data_dir.path()).await?;
    Ok((setup, data_dir))
}

fn number(cell: &Cell) -> f64 {
    cell.to_f64("test").unwrap().unwrap_or(0.0)
}

fn numbers(table: &Table, column: &str) -> Vec<f64> {
    table
        .column(column)
        .unwrap()
        .into_iter()
        .map(number)
        .collect()
}

#[tokio::test]
async fn test_joined_summary_is_driven_by_purchases() -> Result<()> {
    setup_tracing();
    let (setup, _dir) = ingested_fixture().await?;
    let conn = setup.store.connect()?;

    let summary = create_vendor_summary(&conn).await?;

    // Zero-priced and unpriced purchases are excluded.
    assert_eq!(summary.len(), 3);
    let brands: Vec<f64> = numbers(&summary, "Brand");
    assert_eq!(brands, vec![62.0, 63.0, 58.0]);

    let dollars = numbers(&summary, "TotalPurchaseDollars");
    assert_close(dollars[0], 573.40);
    assert_close(dollars[1], 152.30);
    assert_close(dollars[2], 92.80);

    // Brand 63 has no sales; the columns are NULL until cleaning.
    let sales = summary.column("TotalSalesDollars")?;
    assert!(sales[1].is_null());

    // Vendor 4425's sale of brand 62 does not leak into vendor 1128.
    assert_close(number(sales[0]), 369.90);
    Ok(())
}

#[tokio::test]
async fn test_cleaned_rows_match_the_fixture() -> Result<()> {
    setup_tracing();
    let (setup, _dir) = ingested_fixture().await?;
    let conn = setup.store.connect()?;

    let rows = clean_data(&create_vendor_summary(&conn).await?, RatioPolicy::Propagate)?;

    let tequila = &rows[0];
    assert_eq!(tequila.vendor_number, Cell::Integer(1128));
    assert_eq!(tequila.vendor_name, "BROWN-FORMAN CORP");
    assert_eq!(tequila.description, "Herradura Silver Tequila");
    assert_close(tequila.volume, 750.0);
    assert_close(tequila.actual_price, 36.99);
    assert_close(tequila.total_purchase_quantity, 20.0);
    assert_close(tequila.total_sales_quantity, 10.0);
    assert_close(tequila.total_excise_tax, 0.79);
    assert_close(tequila.freight_cost, 10.25);
    assert_close(tequila.gross_profit, 369.90 - 573.40);
    assert_close(tequila.profit_margin, (369.90 - 573.40) / 369.90 * 100.0);
    assert_close(tequila.stock_turnover, 0.5);
    assert_close(tequila.sales_to_purchase_ratio, 369.90 / 573.40);

    let reposado = &rows[1];
    assert_eq!(reposado.description, "Herradura Reposado Tequila");
    assert_eq!(reposado.total_sales_dollars, 0.0);
    assert_eq!(reposado.total_sales_quantity, 0.0);
    assert_eq!(reposado.total_sales_price, 0.0);
    assert_eq!(reposado.total_excise_tax, 0.0);
    assert_close(reposado.freight_cost, 10.25);
    assert_close(reposado.gross_profit, -152.30);
    assert_eq!(reposado.profit_margin, f64::NEG_INFINITY);
    assert_eq!(reposado.stock_turnover, 0.0);
    assert_eq!(reposado.sales_to_purchase_ratio, 0.0);

    let sake = &rows[2];
    assert_eq!(sake.vendor_name, "SHAW ROSS INT L IMP LTD");
    assert_close(sake.total_sales_dollars, 64.95);
    assert_close(sake.total_sales_price, 25.98);
    assert_close(sake.freight_cost, 2.0);
    assert_close(sake.stock_turnover, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_run_summary_persists_the_derived_table() -> Result<()> {
    setup_tracing();
    let (setup, _dir) = ingested_fixture().await?;
    let options = SummaryOptions {
        policy: RatioPolicy::ZeroGuarded,
        ..Default::default()
    };

    let report = run_summary(&setup.store, &options).await?;
    assert_eq!(report.table_name, "vendor_sales_summary");
    assert_eq!(report.rows, 3);

    let table = setup.store.read_table("vendor_sales_summary").await?;
    let expected_columns = VendorSummary::to_table(&[]).columns;
    assert_eq!(table.columns, expected_columns);

    let purchase = numbers(&table, "TotalPurchaseDollars");
    let sales = numbers(&table, "TotalSalesDollars");
    let gross = numbers(&table, "GrossProfit");
    let ratio = numbers(&table, "SalesToPurchaseRatio");
    let margin = numbers(&table, "ProfitMargin");
    for i in 0..table.len() {
        assert_close(gross[i], sales[i] - purchase[i]);
        if purchase[i] != 0.0 {
            assert_close(ratio[i], sales[i] / purchase[i]);
        }
    }
    // Zero sales dollars clamp the margin under the zero-guarded policy.
    assert_eq!(margin[1], 0.0);
    Ok(())
}

#[tokio::test]
async fn test_rerun_produces_identical_summary() -> Result<()> {
    setup_tracing();
    let data_dir = tempdir()?;
    inventory::write_all(data_dir.path())?;
    let db_dir = tempdir()?;
    let setup = TestSetup::with_file(&db_dir.path().join("inventory.db")).await?;
    let options = SummaryOptions::default();

    load_raw_data(&setup.store, data_dir.path()).await?;
    run_summary(&setup.store, &options).await?;
    let first = setup.store.read_table("vendor_sales_summary").await?;

    load_raw_data(&setup.store, data_dir.path()).await?;
    run_summary(&setup.store, &options).await?;
    let second = setup.store.read_table("vendor_sales_summary").await?;

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_custom_summary_table_name() -> Result<()> {
    setup_tracing();
    let (setup, _dir) = ingested_fixture().await?;
    let options = SummaryOptions {
        table_name: "summary_2024".to_string(),
        ..Default::default()
    };

    run_summary(&setup.store, &options).await?;

    let tables = setup.store.list_tables().await?;
    assert!(tables.contains(&"summary_2024".to_string()));
    assert!(!tables.contains(&"vendor_sales_summary".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_missing_raw_tables_fail_the_run() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;

    let result = run_summary(&setup.store, &SummaryOptions::default()).await;

    assert!(result.is_err());
    assert!(setup.store.list_tables().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_text_volume_is_coerced_during_cleaning() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    setup
        .execute_batch(
            "CREATE TABLE purchases (VendorNumber INTEGER, VendorName TEXT, Brand INTEGER, Description TEXT, PurchasePrice REAL, Quantity INTEGER, Dollars REAL);
             INSERT INTO purchases VALUES (1, 'ACME', 10, 'Gin', 5.0, 4, 20.0);
             CREATE TABLE purchase_prices (Brand INTEGER, Price REAL, Volume TEXT);
             INSERT INTO purchase_prices VALUES (10, 7.5, '1750');
             CREATE TABLE sales (VendorNo INTEGER, Brand INTEGER, SalesQuantity INTEGER, SalesDollars REAL, SalesPrice REAL, ExciseTax REAL);
             CREATE TABLE vendor_invoice (VendorNumber INTEGER, Freight REAL);",
        )
        .await?;

    let report = run_summary(&setup.store, &SummaryOptions::default()).await?;
    assert_eq!(report.rows, 1);

    let table = setup.store.read_table("vendor_sales_summary").await?;
    assert_close(numbers(&table, "Volume")[0], 1750.0);
    assert_close(numbers(&table, "GrossProfit")[0], -20.0);
    assert_close(numbers(&table, "FreightCost")[0], 0.0);
    Ok(())
}

#[tokio::test]
async fn test_text_brand_in_purchases_matches_integer_brand_in_sales() -> Result<()> {
    setup_tracing();
    let data_dir = tempdir()?;
    // The "ABC" brand makes purchases.Brand (and vendor_invoice.VendorNumber) TEXT
    // columns, while sales.Brand and sales.VendorNo stay INTEGER.
    write_csv(
        data_dir.path(),
        "purchases.csv",
        "VendorNumber,VendorName,Brand,Description,PurchasePrice,Quantity,Dollars
1128,BROWN-FORMAN CORP,58,Gekkeikan Sake,9.28,10,92.80
1128,BROWN-FORMAN CORP,ABC,Unpriced Item,5.00,1,5.00
",
    )?;
    write_csv(
        data_dir.path(),
        "purchase_prices.csv",
        "Brand,Price,Volume\n58,12.99,750\n",
    )?;
    write_csv(
        data_dir.path(),
        "sales.csv",
        "VendorNo,Brand,SalesQuantity,SalesDollars,SalesPrice,ExciseTax
1128,58,5,64.95,12.99,0.56
",
    )?;
    write_csv(
        data_dir.path(),
        "vendor_invoice.csv",
        "VendorNumber,Freight\n1128,2.00\nN/A,9.00\n",
    )?;
    let setup = TestSetup::new().await?;
    load_raw_data(&setup.store, data_dir.path()).await?;

    let purchases = setup.store.read_table("purchases").await?;
    assert_eq!(purchases.column_types[purchases.column_index("Brand")?], "TEXT");

    let conn = setup.store.connect()?;
    let summary = create_vendor_summary(&conn).await?;
    assert_eq!(summary.len(), 1);
    assert_close(number(summary.column("TotalSalesDollars")?[0]), 64.95);
    assert_close(number(summary.column("FreightCost")?[0]), 2.0);

    let rows = clean_data(&summary, RatioPolicy::Propagate)?;
    assert_close(rows[0].gross_profit, 64.95 - 92.80);
    assert_close(rows[0].stock_turnover, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_null_keys_never_match_and_multiple_matches_repeat_rows() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    setup
        .execute_batch(
            "CREATE TABLE purchases (VendorNumber INTEGER, VendorName TEXT, Brand INTEGER, Description TEXT, PurchasePrice REAL, Quantity INTEGER, Dollars REAL);
             INSERT INTO purchases VALUES (NULL, 'NO VENDOR', 10, 'Gin', 5.0, 1, 5.0);
             INSERT INTO purchases VALUES (2, 'TWO', 10, 'Gin', 5.0, 2, 10.0);
             CREATE TABLE purchase_prices (Brand INTEGER, Price REAL, Volume REAL);
             INSERT INTO purchase_prices VALUES (10, 7.5, 750);
             INSERT INTO purchase_prices VALUES (10, 8.5, 1000);
             CREATE TABLE sales (VendorNo INTEGER, Brand INTEGER, SalesQuantity INTEGER, SalesDollars REAL, SalesPrice REAL, ExciseTax REAL);
             INSERT INTO sales VALUES (NULL, 10, 1, 7.5, 7.5, 0.1);
             CREATE TABLE vendor_invoice (VendorNumber INTEGER, Freight REAL);
             INSERT INTO vendor_invoice VALUES (NULL, 4.0);",
        )
        .await?;
    let conn = setup.store.connect()?;

    let summary = create_vendor_summary(&conn).await?;

    // Each purchase matches both price rows, so each appears twice.
    assert_eq!(summary.len(), 4);
    let vendors = summary.column("VendorNumber")?;
    assert_eq!(vendors[0], &Cell::Integer(2));
    assert_eq!(vendors[1], &Cell::Integer(2));
    assert!(vendors[2].is_null());
    assert!(summary.column("TotalSalesDollars")?.iter().all(|c| c.is_null()));
    assert!(summary.column("FreightCost")?.iter().all(|c| c.is_null()));
    Ok(())
}

#[tokio::test]
async fn test_nan_ratio_is_stored_as_null_and_infinity_survives() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new().await?;
    setup
        .execute_batch(
            "CREATE TABLE purchases (VendorNumber INTEGER, VendorName TEXT, Brand INTEGER, Description TEXT, PurchasePrice REAL, Quantity INTEGER, Dollars REAL);
             INSERT INTO purchases VALUES (1, 'ACME', 10, 'Gin', 5.0, 0, 20.0);
             CREATE TABLE purchase_prices (Brand INTEGER, Price REAL, Volume REAL);
             INSERT INTO purchase_prices VALUES (10, 7.5, 750);
             CREATE TABLE sales (VendorNo INTEGER, Brand INTEGER, SalesQuantity INTEGER, SalesDollars REAL, SalesPrice REAL, ExciseTax REAL);
             CREATE TABLE vendor_invoice (VendorNumber INTEGER, Freight REAL);",
        )
        .await?;
    let options = SummaryOptions {
        policy: RatioPolicy::Propagate,
        ..Default::default()
    };

    run_summary(&setup.store, &options).await?;
    let first = setup.store.read_table("vendor_sales_summary").await?;

    assert_eq!(first.len(), 1);
    // 0 sold / 0 purchased is NaN, which SQLite keeps as NULL.
    assert!(first.column("StockTurnover")?[0].is_null());
    assert_eq!(
        first.column("ProfitMargin")?[0],
        &Cell::Real(f64::NEG_INFINITY)
    );
    assert_eq!(first.column("SalesToPurchaseRatio")?[0], &Cell::Real(0.0));

    run_summary(&setup.store, &options).await?;
    let second = setup.store.read_table("vendor_sales_summary").await?;
    assert_eq!(first, second);
    Ok(())
}
