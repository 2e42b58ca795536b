//! The aggregation query behind the vendor summary.
//!
//! Every output column is aliased so result columns can be looked up by name.

/// The vendor summary: three rollups joined into one row per purchased
/// vendor, brand and price point.
///
/// The purchase rollup drives; sales are left-joined on vendor and brand, freight
/// on vendor. Ties on `TotalPurchaseDollars` fall back to the purchase group key.
pub const VENDOR_SUMMARY_SQL: &str = "
WITH FreightSummary AS (
    SELECT
        VendorNumber,
        SUM(Freight) AS FreightCost
    FROM vendor_invoice
    GROUP BY VendorNumber
),
PurchaseSummary AS (
    SELECT
        p.VendorNumber,
        p.VendorName,
        p.Brand,
        p.Description,
        p.PurchasePrice,
        pp.Price AS ActualPrice,
        pp.Volume,
        SUM(p.Quantity) AS TotalPurchaseQuantity,
        SUM(p.Dollars) AS TotalPurchaseDollars
    FROM purchases AS p
    JOIN purchase_prices AS pp
        ON p.Brand = pp.Brand
    WHERE p.PurchasePrice > 0
    GROUP BY p.VendorNumber, p.VendorName, p.Brand, p.Description, p.PurchasePrice, pp.Price, pp.Volume
),
SalesSummary AS (
    SELECT
        VendorNo,
        Brand,
        SUM(SalesQuantity) AS TotalSalesQuantity,
        SUM(SalesDollars) AS TotalSalesDollars,
        SUM(SalesPrice) AS TotalSalesPrice,
        SUM(ExciseTax) AS TotalExciseTax
    FROM sales
    GROUP BY VendorNo, Brand
)
SELECT
    ps.VendorNumber AS VendorNumber,
    ps.VendorName AS VendorName,
    ps.Brand AS Brand,
    ps.Description AS Description,
    ps.PurchasePrice AS PurchasePrice,
    ps.Volume AS Volume,
    ps.ActualPrice AS ActualPrice,
    ps.TotalPurchaseQuantity AS TotalPurchaseQuantity,
    ps.TotalPurchaseDollars AS TotalPurchaseDollars,
    ss.TotalSalesDollars AS TotalSalesDollars,
    ss.TotalSalesQuantity AS TotalSalesQuantity,
    ss.TotalSalesPrice AS TotalSalesPrice,
    ss.TotalExciseTax AS TotalExciseTax,
    fs.FreightCost AS FreightCost
FROM PurchaseSummary AS ps
LEFT JOIN SalesSummary AS ss
    ON ps.VendorNumber = ss.VendorNo
    AND ps.Brand = ss.Brand
LEFT JOIN FreightSummary AS fs
    ON ps.VendorNumber = fs.VendorNumber
ORDER BY
    ps.TotalPurchaseDollars DESC,
    ps.VendorNumber,
    ps.Brand,
    ps.VendorName,
    ps.Description,
    ps.PurchasePrice,
    ps.Volume,
    ps.ActualPrice,
    ss.TotalSalesDollars,
    fs.FreightCost";

/// Columns of the joined summary, before cleaning adds the derived ratios.
pub const JOINED_COLUMNS: [&str; 14] = [
    "VendorNumber",
    "VendorName",
    "Brand",
    "Description",
    "PurchasePrice",
    "Volume",
    "ActualPrice",
    "TotalPurchaseQuantity",
    "TotalPurchaseDollars",
    "TotalSalesDollars",
    "TotalSalesQuantity",
    "TotalSalesPrice",
    "TotalExciseTax",
    "FreightCost",
];

/// Columns appended by the cleaning step.
pub const DERIVED_COLUMNS: [&str; 4] = [
    "GrossProfit",
    "ProfitMargin",
    "StockTurnover",
    "SalesToPurchaseRatio",
];
