use chrono::NaiveDate;
use envconfig::Envconfig;

use pharmadesk::api::models::{LoginRequest, MedicineInput, UserType};
use pharmadesk::api::{HttpClient, PharmacyApi};
use pharmadesk::config::Config;
use pharmadesk::utils::format_date;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Envconfig)]
struct SeedConfig {
    #[envconfig(from = "PHARMADESK_SEED_USERNAME", default = "admin1")]
    username: String,

    #[envconfig(from = "PHARMADESK_SEED_PASSWORD")]
    password: String,
}

struct SeedMedicine {
    name: &'static str,
    batch: &'static str,
    stock: i64,
    price: f64,
    expiry: (i32, u32, u32),
    category: &'static str,
}

const SEED_MEDICINES: [SeedMedicine; 10] = [
    SeedMedicine {
        name: "Aspirin",
        batch: "AS-2501",
        stock: 500,
        price: 1.20,
        expiry: (2026, 6, 30),
        category: "Pain Relief",
    },
    SeedMedicine {
        name: "Amoxicillin",
        batch: "AM-2502",
        stock: 30,
        price: 4.75,
        expiry: (2025, 12, 31),
        category: "Antibiotic",
    },
    SeedMedicine {
        name: "Lisinopril",
        batch: "LI-2503",
        stock: 400,
        price: 3.10,
        expiry: (2026, 3, 15),
        category: "Cardiovascular",
    },
    SeedMedicine {
        name: "Levothyroxine",
        batch: "LE-2504",
        stock: 250,
        price: 2.40,
        expiry: (2027, 1, 31),
        category: "Hormone",
    },
    SeedMedicine {
        name: "Metformin",
        batch: "ME-2505",
        stock: 75,
        price: 1.85,
        expiry: (2026, 9, 30),
        category: "Diabetes",
    },
    SeedMedicine {
        name: "Amlodipine",
        batch: "AL-2506",
        stock: 200,
        price: 2.15,
        expiry: (2025, 11, 30),
        category: "Cardiovascular",
    },
    SeedMedicine {
        name: "Omeprazole",
        batch: "OM-2507",
        stock: 45,
        price: 12.50,
        expiry: (2026, 7, 31),
        category: "Gastrointestinal",
    },
    SeedMedicine {
        name: "Albuterol",
        batch: "AB-2508",
        stock: 150,
        price: 18.00,
        expiry: (2027, 4, 30),
        category: "Respiratory",
    },
    SeedMedicine {
        name: "Gabapentin",
        batch: "GA-2509",
        stock: 300,
        price: 6.30,
        expiry: (2026, 5, 31),
        category: "Neurology",
    },
    SeedMedicine {
        name: "Metoprolol",
        batch: "MP-2510",
        stock: 90,
        price: 2.80,
        expiry: (2025, 10, 31),
        category: "Cardiovascular",
    },
];

fn seed_inputs(purchased: NaiveDate) -> Vec<MedicineInput> {
    SEED_MEDICINES
        .iter()
        .filter_map(|seed| {
            let (y, m, d) = seed.expiry;
            let expiry = NaiveDate::from_ymd_opt(y, m, d)?;
            Some(MedicineInput {
                medicine_name: seed.name.to_string(),
                batch_number: seed.batch.to_string(),
                expiry_date: format_date(expiry),
                date_of_purchase: format_date(purchased),
                quantity_available: seed.stock,
                unit_price: seed.price,
                manufacturer: String::new(),
                category: seed.category.to_string(),
                description: format!("{} sample stock", seed.name),
            })
        })
        .collect()
}

/// Signs in as an administrator and posts the sample catalogue.
///
/// Medicines the server rejects (for example a batch number that already
/// exists) are logged and skipped.
async fn seed_medicines(api: &HttpClient, seed: &SeedConfig) -> Result<usize, Error> {
    let user = api
        .login(&LoginRequest {
            username: seed.username.clone(),
            password: seed.password.clone(),
            user_type: UserType::Admin,
        })
        .await?;
    log::info!("Seeding as {}", user.full_name);

    let today = chrono::Local::now().date_naive();
    let mut created = 0;
    for input in seed_inputs(today) {
        match api.create_medicine(&input).await {
            Ok(_) => {
                log::info!("Added {} ({})", input.medicine_name, input.batch_number);
                created += 1;
            }
            Err(e) => log::warn!("Skipped {}: {}", input.medicine_name, e),
        }
    }
    Ok(created)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    let seed = SeedConfig::init_from_env()?;
    let api = HttpClient::new(&config.api_base_url, &config.chatbot_base_url)?;

    let created = seed_medicines(&api, &seed).await?;
    log::info!("Seeded {} of {} medicines", created, SEED_MEDICINES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalogue_is_well_formed() {
        let purchased = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let inputs = seed_inputs(purchased);
        assert_eq!(inputs.len(), SEED_MEDICINES.len());
        assert!(inputs.iter().all(|i| i.date_of_purchase == "2025-01-15"));

        let mut batches: Vec<_> = inputs.iter().map(|i| i.batch_number.as_str()).collect();
        batches.sort();
        batches.dedup();
        assert_eq!(batches.len(), inputs.len());
    }
}
