//! Seed the database with sample artisans and products.
//!
//! Useful for local development: gives the search index something to chew on
//! without hand-crafting rows. Idempotence is not attempted; running twice
//! creates a second copy of everything.

use tracing::info;

use shilpkaar_catalog::db::{ArtisanRepository, ProductRepository};
use shilpkaar_catalog::{ArtisanProfileDraft, ProductDraft};
use shilpkaar_core::{Gender, Price, Season, UserRole};

use super::migrate::{MigrationError, database_url};

/// Insert sample artisans with a few products each.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url().map_err(MigrationError::from)?;
    let pool = shilpkaar_catalog::create_pool(&database_url).await?;

    let artisans = ArtisanRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    for (profile, drafts) in sample_catalog() {
        let artisan = artisans.create(&profile.name, UserRole::Artisan).await?;
        let artisan = artisans.update_profile(artisan.id, &profile).await?;
        info!(artisan = %artisan.name, id = artisan.id.as_i32(), "Seeded artisan");

        for draft in drafts {
            let product = products.create(artisan.id, &draft).await?;
            info!(product = %product.name, id = product.id.as_i32(), "Seeded product");
        }
    }

    info!("Seeding complete!");
    Ok(())
}

fn sample_catalog() -> Vec<(ArtisanProfileDraft, Vec<ProductDraft>)> {
    vec![
        (
            profile(
                "Meera Devi",
                "blue pottery",
                "Jaipur",
                "north",
                "Rajasthan",
                &["hand painting", "glazing"],
            ),
            vec![
                product(
                    "Blue Pottery Vase",
                    "Hand-painted blue pottery vase with traditional floral motifs.",
                    1_49_900,
                    "home-decor",
                    "blue pottery",
                    &["ceramic", "quartz"],
                    &["blue", "white"],
                ),
                product(
                    "Blue Pottery Coaster Set",
                    "Set of six glazed coasters in Jaipur's signature cobalt patterns.",
                    59_900,
                    "home-decor",
                    "blue pottery",
                    &["ceramic"],
                    &["blue"],
                ),
            ],
        ),
        (
            profile(
                "Abdul Rashid",
                "pashmina weaving",
                "Srinagar",
                "north",
                "Jammu and Kashmir",
                &["hand spinning", "twill weaving"],
            ),
            vec![product(
                "Pashmina Shawl",
                "Hand-spun pashmina shawl woven from fine Changthangi wool.",
                8_99_900,
                "clothing",
                "pashmina weaving",
                &["pashmina wool"],
                &["ivory"],
            )],
        ),
        (
            profile(
                "Lakshmi Amma",
                "kanjeevaram weaving",
                "Kanchipuram",
                "south",
                "Tamil Nadu",
                &["silk weaving", "zari work"],
            ),
            vec![product(
                "Kanjeevaram Silk Saree",
                "Pure mulberry silk saree with gold zari border, woven on a pit loom.",
                12_49_900,
                "sarees",
                "kanjeevaram weaving",
                &["silk", "zari"],
                &["red", "gold"],
            )],
        ),
    ]
}

fn profile(
    name: &str,
    craft: &str,
    city: &str,
    region: &str,
    state: &str,
    techniques: &[&str],
) -> ArtisanProfileDraft {
    ArtisanProfileDraft {
        name: name.to_string(),
        craft: Some(craft.to_string()),
        crafts: vec![craft.to_string()],
        location: Some(format!("{city}, {state}")),
        region: Some(region.to_string()),
        state: Some(state.to_string()),
        city: Some(city.to_string()),
        techniques: techniques.iter().map(ToString::to_string).collect(),
        specializations: vec![],
        certifications: vec![],
        languages: vec!["hindi".to_string(), "english".to_string()],
        bio: Some(format!("Third-generation {craft} artisan from {city}.")),
    }
}

fn product(
    name: &str,
    description: &str,
    price_paise: i64,
    category: &str,
    craft: &str,
    materials: &[&str],
    colors: &[&str],
) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        description: description.to_string(),
        price: Price::from_paise(price_paise),
        original_price: None,
        stock: 10,
        category: category.to_string(),
        subcategory: None,
        craft: Some(craft.to_string()),
        tags: vec!["handmade".to_string(), craft.to_string()],
        materials: materials.iter().map(ToString::to_string).collect(),
        colors: colors.iter().map(ToString::to_string).collect(),
        techniques: vec![],
        occasions: vec!["festive".to_string()],
        search_keywords: vec![],
        age_group: None,
        gender: Some(Gender::Unisex),
        season: Some(Season::AllSeason),
        sustainability: true,
        featured: false,
        trending: false,
    }
}
