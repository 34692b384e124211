pub mod csv_loader;
pub mod normalize;
pub mod pairings;
pub mod record;
pub mod supabase;

pub use csv_loader::{load_ingredients_csv, load_pairings_csv};
pub use pairings::PairingSet;
pub use record::{IngredientRecord, Macros, Role, UNIVERSAL};
pub use supabase::{CatalogError, SupabaseCatalog};
