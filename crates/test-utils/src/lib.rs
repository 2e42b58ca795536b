use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use vendorsum::db::Store;

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: Store,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database.
    pub async fn new() -> Result<Self> {
        let store = Store::open(":memory:").await?;
        Ok(Self { store })
    }

    /// Opens (or creates) a file-backed database at `db_path`.
    pub async fn with_file(db_path: &Path) -> Result<Self> {
        let path = db_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Database path is not valid UTF-8"))?;
        let store = Store::open(path).await?;
        Ok(Self { store })
    }

    /// Executes several `;`-separated SQL statements, e.g. to seed raw tables.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.store.connect()?;
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }
}

// --- CSV Fixtures ---

/// Writes `contents` to `dir/file_name` and returns the full path.
pub fn write_csv(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// A small inventory dataset with the four raw tables the summary reads.
///
/// Expected summary, ordered by purchase dollars:
/// - vendor 1128 / brand 62: purchases 20 units for 573.40, sales 10 units for 369.90
/// - vendor 1128 / brand 63: purchases 5 units for 152.30, no sales
/// - vendor 8320 / brand 58: purchases 10 units for 92.80, sales 5 units for 64.95
///
/// Brand 77 is dropped because its purchase price is zero, and brand 88 because
/// it has no `purchase_prices` row. Vendor 4425's sale of brand 62 matches no
/// purchase and must not leak into vendor 1128's row.
pub mod inventory {
    use super::*;

    pub const PURCHASES_CSV: &str = "\
InventoryId,Store,Brand,Description,Size,VendorNumber,VendorName,PONumber,PurchasePrice,Quantity,Dollars
69_LONDON_58,69,58,Gekkeikan Black & Gold Sake,750mL,8320,SHAW ROSS INT L IMP LTD   ,8124,9.28,6,55.68
30_CULCHETH_58,30,58,Gekkeikan Black & Gold Sake,750mL,8320,SHAW ROSS INT L IMP LTD   ,8137,9.28,4,37.12
1_HARDERSFIELD_62,1,62,Herradura Silver Tequila,750mL,1128,BROWN-FORMAN CORP,8169,28.67,20,573.40
1_HARDERSFIELD_63,1,63,Herradura Reposado Tequila  ,750mL,1128,BROWN-FORMAN CORP,8169,30.46,5,152.30
2_ASHBORNE_77,2,77,Sample Promo Pack,1L,9999,ZERO PRICE CO,8200,0,3,0
2_ASHBORNE_88,2,88,Unpriced Item,750mL,1128,BROWN-FORMAN CORP,8201,5.00,1,5.00
";

    pub const PURCHASE_PRICES_CSV: &str = "\
Brand,Description,Price,Size,Volume,Classification,PurchasePrice,VendorNumber,VendorName
58,Gekkeikan Black & Gold Sake,12.99,750mL,750,1,9.28,8320,SHAW ROSS INT L IMP LTD
62,Herradura Silver Tequila,36.99,750mL,750,1,28.67,1128,BROWN-FORMAN CORP
63,Herradura Reposado Tequila,38.99,750mL,750,1,30.46,1128,BROWN-FORMAN CORP
77,Sample Promo Pack,9.99,1L,1000,1,0,9999,ZERO PRICE CO
";

    pub const SALES_CSV: &str = "\
InventoryId,Store,Brand,Description,Size,SalesQuantity,SalesDollars,SalesPrice,SalesDate,Volume,Classification,ExciseTax,VendorNo,VendorName
1_HARDERSFIELD_58,1,58,Gekkeikan Black & Gold Sake,750mL,2,25.98,12.99,2024-01-01,750,1,0.22,8320,SHAW ROSS INT L IMP LTD
1_HARDERSFIELD_58,1,58,Gekkeikan Black & Gold Sake,750mL,3,38.97,12.99,2024-01-02,750,1,0.34,8320,SHAW ROSS INT L IMP LTD
1_HARDERSFIELD_62,1,62,Herradura Silver Tequila,750mL,10,369.90,36.99,2024-01-02,750,1,0.79,1128,BROWN-FORMAN CORP
5_SUTTON_62,5,62,Herradura Silver Tequila,750mL,1,36.99,36.99,2024-01-03,750,1,0.08,4425,MARTIGNETTI COMPANIES
";

    pub const VENDOR_INVOICE_CSV: &str = "\
VendorNumber,VendorName,InvoiceDate,PONumber,PODate,PayDate,Quantity,Dollars,Freight,Approval
8320,SHAW ROSS INT L IMP LTD,2024-01-04,8124,2023-12-21,2024-02-16,6,55.68,1.57,
8320,SHAW ROSS INT L IMP LTD,2024-01-05,8137,2023-12-22,2024-02-17,4,37.12,0.43,
1128,BROWN-FORMAN CORP,2024-01-07,8169,2023-12-24,2024-02-21,25,725.70,10.25,Frank Delahunt
";

    /// Writes the four raw CSV files into `dir`.
    pub fn write_all(dir: &Path) -> Result<()> {
        write_csv(dir, "purchases.csv", PURCHASES_CSV)?;
        write_csv(dir, "purchase_prices.csv", PURCHASE_PRICES_CSV)?;
        write_csv(dir, "sales.csv", SALES_CSV)?;
        write_csv(dir, "vendor_invoice.csv", VENDOR_INVOICE_CSV)?;
        Ok(())
    }
}
