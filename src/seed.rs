use chrono::{NaiveDate, Utc};
use dotenvy::dotenv;
use envconfig::Envconfig;
use mongodb::bson::doc;

use pharmastore::config::Config;
use pharmastore::db;
use pharmastore::db::models::Medicine;
use pharmastore::Error;

fn seed_medicine(
    name: &str,
    category: &str,
    manufacturer: &str,
    price: f64,
    quantity: i64,
    expiry: (i32, u32, u32),
    prescription_required: bool,
) -> Option<Medicine> {
    let now = Utc::now();
    Some(Medicine {
        id: None,
        name: name.to_string(),
        category: category.to_string(),
        price,
        quantity,
        expiry: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2)?,
        manufacturer: manufacturer.to_string(),
        description: String::new(),
        image: String::new(),
        prescription_required,
        created_at: now,
        updated_at: now,
    })
}

fn get_seed_medicines() -> Vec<Medicine> {
    [
        seed_medicine("Aspirin", "Pain Relief", "Bayer", 4.99, 500, (2027, 6, 30), false),
        seed_medicine("Amoxicillin", "Antibiotics", "GSK", 12.50, 300, (2026, 12, 31), true),
        seed_medicine("Lisinopril", "Blood Pressure", "AstraZeneca", 8.75, 400, (2027, 3, 15), true),
        seed_medicine("Levothyroxine", "Hormones", "AbbVie", 15.00, 250, (2028, 1, 31), true),
        seed_medicine("Metformin", "Diabetes", "Teva", 6.25, 350, (2027, 9, 30), true),
        seed_medicine("Amlodipine", "Blood Pressure", "Pfizer", 7.40, 8, (2026, 11, 30), true),
        seed_medicine("Omeprazole", "Digestive", "AstraZeneca", 9.99, 450, (2027, 7, 31), false),
        seed_medicine("Albuterol", "Respiratory", "GSK", 22.00, 5, (2028, 4, 30), true),
        seed_medicine("Gabapentin", "Neurology", "Pfizer", 11.30, 300, (2027, 5, 31), true),
        seed_medicine("Metoprolol", "Blood Pressure", "Novartis", 5.85, 0, (2025, 10, 31), true),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::init_from_env()?;
    let db = db::init_db(&config.mongodb_uri, &config.database_name).await?;
    let medicines = db.collection::<Medicine>("medicines");

    if medicines.count_documents(doc! {}).await? > 0 {
        log::info!("Medicines collection already populated, nothing to do");
        return Ok(());
    }

    let seed = get_seed_medicines();
    let count = seed.len();
    medicines.insert_many(&seed).await?;
    log::info!("Seeded {count} medicines");

    Ok(())
}
