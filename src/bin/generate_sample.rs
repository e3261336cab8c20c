use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const MONTHS: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];

/// (product, category, unit price)
const PRODUCTS: [(&str, &str, f64); 8] = [
    ("Maçã", "Fruta", 1.80),
    ("Banana", "Fruta", 0.90),
    ("Laranja", "Fruta", 1.20),
    ("Alface", "Verdura", 3.50),
    ("Couve", "Verdura", 4.00),
    ("Tomate", "Legume", 2.30),
    ("Cenoura", "Legume", 1.60),
    ("Batata", "Legume", 1.10),
];

const PAYMENT_METHODS: [&str; 3] = ["Pix", "Cartão", "Dinheiro"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

/// `1234.5` → `"R$ 1.234,50"`
fn brl(value: f64) -> String {
    let cents = (value * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("R$ {grouped},{:02}", cents % 100)
}

struct Row {
    year: i64,
    month: &'static str,
    week: i64,
    product: &'static str,
    category: &'static str,
    quantity: Option<i64>,
    revenue: String,
    expense: String,
    payment: &'static str,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();

    for year in [2024, 2025] {
        for (m, &month) in MONTHS.iter().enumerate() {
            rows.push(Row {
                year,
                month,
                week: m as i64 * 4 + 1,
                product: "Aluguel",
                category: "Despesa",
                quantity: None,
                revenue: brl(0.0),
                expense: brl(1200.0),
                payment: "Pix",
            });

            for w in 0..4 {
                let week = m as i64 * 4 + w + 1;
                for &(product, category, price) in &PRODUCTS {
                    if rng.next_f64() < 0.3 {
                        continue;
                    }
                    let quantity = 5 + rng.below(40) as i64;
                    let revenue = quantity as f64 * price * (0.9 + rng.next_f64() * 0.2);
                    // a few hand-typed cells that the dashboard must tolerate
                    let revenue = if rng.next_f64() < 0.01 {
                        "R$ --".to_string()
                    } else {
                        brl(revenue)
                    };
                    let payment = if rng.next_f64() < 0.03 {
                        ""
                    } else {
                        PAYMENT_METHODS[rng.below(PAYMENT_METHODS.len())]
                    };
                    rows.push(Row {
                        year,
                        month,
                        week,
                        product,
                        category,
                        quantity: Some(quantity),
                        revenue,
                        expense: brl(0.0),
                        payment,
                    });
                }

                rows.push(Row {
                    year,
                    month,
                    week,
                    product: "Fornecedor",
                    category: "Despesa",
                    quantity: None,
                    revenue: brl(0.0),
                    expense: brl(150.0 + rng.next_f64() * 250.0),
                    payment: PAYMENT_METHODS[rng.below(2)],
                });
            }
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).context("creating CSV file")?;
    wtr.write_record([
        "ano",
        "mes",
        "semana",
        "produto",
        "categoria",
        "quantidade",
        "receita",
        "despesa",
        "forma_pagamento",
    ])?;
    for r in rows {
        wtr.write_record([
            r.year.to_string(),
            r.month.to_string(),
            r.week.to_string(),
            r.product.to_string(),
            r.category.to_string(),
            r.quantity.map(|q| q.to_string()).unwrap_or_default(),
            r.revenue.clone(),
            r.expense.clone(),
            r.payment.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("ano", DataType::Int64, false),
        Field::new("mes", DataType::Utf8, false),
        Field::new("semana", DataType::Int64, false),
        Field::new("produto", DataType::Utf8, false),
        Field::new("categoria", DataType::Utf8, false),
        Field::new("quantidade", DataType::Float64, true),
        Field::new("receita", DataType::Utf8, false),
        Field::new("despesa", DataType::Utf8, false),
        Field::new("forma_pagamento", DataType::Utf8, false),
    ]));

    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
        text(|r| r.month),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.week).collect::<Vec<_>>())),
        text(|r| r.product),
        text(|r| r.category),
        Arc::new(Float64Array::from(
            rows.iter()
                .map(|r| r.quantity.map(|q| q as f64))
                .collect::<Vec<_>>(),
        )),
        text(|r| r.revenue.as_str()),
        text(|r| r.expense.as_str()),
        text(|r| r.payment),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "dados_quitanda.csv".to_string()),
    );
    write_csv(&rows, &csv_path)?;

    let parquet_path = csv_path.with_extension("parquet");
    write_parquet(&rows, &parquet_path)?;

    println!(
        "Wrote {} transactions to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
