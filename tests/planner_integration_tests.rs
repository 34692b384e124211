use meal_planner::catalog::{IngredientRecord, Macros, PairingSet, Role};
use meal_planner::planner::composition::{contains_banned_pair, Composition};
use meal_planner::planner::{MacroTargets, Plan, Preset, PlannerError, Slot, WeekPlanner, DAYS_PER_WEEK};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

const CUISINES: [&str; 3] = ["thai", "italian", "mexican"];

/// (role, how many, base protein/carbs/fat per serving, allowed slots)
const LAYOUT: &[(Role, usize, f64, f64, f64, &[&str])] = &[
    (Role::BaseProtein, 7, 30.0, 2.0, 6.0, &["lunch", "dinner"]),
    (Role::SecondaryProtein, 4, 12.0, 3.0, 4.0, &[]),
    (Role::BaseCarb, 6, 5.0, 45.0, 1.5, &[]),
    (Role::LeafyGreen, 5, 2.0, 3.0, 0.3, &[]),
    (Role::Vegetable, 8, 2.0, 8.0, 0.3, &[]),
    (Role::FatSource, 4, 0.0, 0.0, 10.0, &[]),
    (Role::DressingSauce, 5, 1.0, 6.0, 6.0, &["lunch", "dinner"]),
    (Role::Topping, 5, 3.0, 8.0, 3.0, &[]),
    (Role::Garnish, 4, 0.5, 1.0, 0.1, &["universal"]),
    (Role::Other, 2, 1.0, 2.0, 0.5, &[]),
];

/// Fifty records over every role and three cuisines, with mild macro
/// variation inside each role and a few allergen tags.
fn synthetic_catalog() -> Vec<IngredientRecord> {
    let mut out = Vec::new();
    for (role, count, p, c, f, slots) in LAYOUT {
        for i in 0..*count {
            let scale = 0.85 + 0.1 * (i % 4) as f64;
            let cuisine = CUISINES[(out.len() + i) % CUISINES.len()];
            let mut cuisines = vec![cuisine.to_string()];
            if i % 5 == 4 {
                cuisines.push("universal".to_string());
            }
            let allergens = match (role, i) {
                (Role::BaseCarb, 0) | (Role::BaseCarb, 3) => vec!["gluten".to_string()],
                (Role::BaseProtein, 2) | (Role::Topping, 1) => vec!["Dairy".to_string()],
                _ => vec![],
            };
            let (protein, carbs, fat) = (p * scale, c * scale, f * scale);
            out.push(IngredientRecord {
                id: format!("{}-{}", role, i),
                name: format!("{} {} {}", cuisine, role, i),
                role: *role,
                category: "test".to_string(),
                cuisines,
                meal_slots: slots.iter().map(|s| s.to_string()).collect(),
                diet_tags: vec![],
                allergens,
                macros: Macros {
                    protein,
                    carbs,
                    fat,
                    sugar: carbs * 0.1,
                    fiber: carbs * 0.05,
                    kcal: protein * 4.0 + carbs * 4.0 + fat * 9.0,
                },
                price_per_serving: 0.5 + 0.25 * i as f64,
            });
        }
    }
    assert_eq!(out.len(), 50);
    out
}

fn targets() -> MacroTargets {
    MacroTargets { protein: 150.0, carbs: 250.0, fat: 60.0 }
}

fn run(preset: Preset, allergens: &[String], seed: u64) -> Plan {
    let catalog = synthetic_catalog();
    let mut rng = StdRng::seed_from_u64(seed);
    WeekPlanner::new(preset)
        .plan_week(&catalog, targets(), allergens, &PairingSet::default(), &mut rng)
        .expect("plan should be produced")
}

fn committed_meals(plan: &Plan) -> Vec<(Slot, &meal_planner::planner::MealEntry)> {
    plan.days
        .iter()
        .flat_map(|d| {
            [
                (Slot::Breakfast, &d.meals.breakfast),
                (Slot::Lunch, &d.meals.lunch),
                (Slot::Dinner, &d.meals.dinner),
            ]
        })
        .collect()
}

#[test]
fn test_balanced_week_shape_and_accuracy() {
    let plan = run(Preset::Balanced, &[], 12345);

    assert_eq!(plan.days.len(), DAYS_PER_WEEK as usize);
    for (idx, day) in plan.days.iter().enumerate() {
        assert_eq!(day.day as usize, idx + 1);
        let b = day.meals.breakfast.names.len();
        assert!((6..=8).contains(&b), "breakfast has {} items", b);
        for meal in [&day.meals.lunch, &day.meals.dinner] {
            assert!((8..=10).contains(&meal.names.len()), "main meal has {} items", meal.names.len());
        }
    }
    assert!(
        plan.average_relative_error() < 0.25,
        "average relative error {} too high",
        plan.average_relative_error()
    );
}

#[test]
fn test_committed_meal_invariants() {
    let plan = run(Preset::Fast, &[], 7);

    let mut signatures = HashSet::new();
    for (slot, meal) in committed_meals(&plan) {
        let dressings = meal.roles.iter().filter(|r| **r == Role::DressingSauce).count();
        assert!(dressings <= 1, "{} has {} dressings", slot, dressings);
        assert!(!contains_banned_pair(&meal.names));

        let mut sig: Vec<String> = meal.names.iter().map(|n| n.to_lowercase()).collect();
        sig.sort();
        assert!(signatures.insert(sig), "repeated meal in {}", slot);
    }
    assert_eq!(signatures.len(), 21);
}

#[test]
fn test_weekly_totals_are_additive() {
    let plan = run(Preset::Fast, &[], 99);

    let meals = committed_meals(&plan);
    let protein: f64 = meals.iter().map(|(_, m)| m.macros.protein).sum();
    let carbs: f64 = meals.iter().map(|(_, m)| m.macros.carbs).sum();
    let fat: f64 = meals.iter().map(|(_, m)| m.macros.fat).sum();
    let kcal: f64 = meals.iter().map(|(_, m)| m.macros.kcal).sum();
    let price: f64 = meals.iter().map(|(_, m)| m.price).sum();

    let wt = &plan.weekly_totals;
    assert!((wt.protein - protein).abs() < 1e-6);
    assert!((wt.carbs - carbs).abs() < 1e-6);
    assert!((wt.fat - fat).abs() < 1e-6);
    assert!((wt.kcal - kcal).abs() < 1e-6);
    assert!((wt.price - price).abs() < 1e-6);

    let day_sum: f64 = plan.days.iter().map(|d| d.totals.kcal).sum();
    assert!((wt.kcal - day_sum).abs() < 1e-6);
}

#[test]
fn test_excluded_allergens_never_appear() {
    let allergens = vec!["GLUTEN".to_string(), " dairy ".to_string()];
    let plan = run(Preset::Fast, &allergens, 3);

    assert_eq!(plan.inputs.allergens, vec!["dairy", "gluten"]);
    for (_, meal) in committed_meals(&plan) {
        assert!(!meal.allergens.iter().any(|a| a == "gluten" || a == "dairy"), "{:?}", meal.allergens);
    }
}

#[test]
fn test_same_seed_reproduces_plan() {
    let a = run(Preset::Fast, &[], 2024);
    let b = run(Preset::Fast, &[], 2024);
    let a_json = serde_json::to_string(&a).unwrap();
    let b_json = serde_json::to_string(&b).unwrap();
    assert_eq!(a_json, b_json);
}

#[test]
fn test_fast_and_deep_are_valid_and_effort_ordered() {
    let fast = run(Preset::Fast, &[], 555);
    let deep = run(Preset::Deep, &[], 555);

    assert_eq!(fast.days.len(), 7);
    assert_eq!(deep.days.len(), 7);
    assert!(deep.stats.candidates_scored >= fast.stats.candidates_scored);
    assert!(deep.stats.combinations_evaluated >= fast.stats.combinations_evaluated);
}

#[test]
fn test_unknown_preset_is_configuration_error() {
    let err = WeekPlanner::from_preset_name("extreme").unwrap_err();
    assert!(matches!(err, PlannerError::UnknownPreset(_)));
}

#[test]
fn test_missing_dressings_surface_as_day_error() {
    let catalog: Vec<IngredientRecord> = synthetic_catalog()
        .into_iter()
        .filter(|r| r.role != Role::DressingSauce)
        .collect();
    let mut rng = StdRng::seed_from_u64(1);
    let err = WeekPlanner::new(Preset::Fast)
        .plan_week(&catalog, targets(), &[], &PairingSet::default(), &mut rng)
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot assemble day 1: no valid lunch candidates");
}

#[test]
fn test_pairings_steer_selection() {
    let catalog = synthetic_catalog();
    let carb = catalog.iter().find(|r| r.role == Role::BaseCarb && r.allergens.is_empty()).unwrap();
    let green = catalog
        .iter()
        .find(|r| r.role == Role::LeafyGreen && r.cuisines[0] == carb.cuisines[0])
        .unwrap();
    let pairings: PairingSet = vec![(carb.name.as_str(), green.name.as_str())].into_iter().collect();

    let mut rng = StdRng::seed_from_u64(10);
    let plan = WeekPlanner::new(Preset::Balanced)
        .plan_week(&catalog, targets(), &[], &pairings, &mut rng)
        .unwrap();

    let paired = committed_meals(&plan)
        .iter()
        .filter(|(_, m)| m.names.contains(&carb.name) && m.names.contains(&green.name))
        .count();
    assert!(paired >= 1, "validated pairing never selected");
}

#[test]
fn test_custom_composition_bounds_meal_sizes() {
    let mut composition = Composition::default();
    composition.lunch.max_items = 8;
    composition.dinner.min_items = 9;

    let catalog = synthetic_catalog();
    let mut rng = StdRng::seed_from_u64(31);
    let plan = WeekPlanner::new(Preset::Fast)
        .with_composition(composition)
        .plan_week(&catalog, targets(), &[], &PairingSet::default(), &mut rng)
        .unwrap();

    for day in &plan.days {
        assert_eq!(day.meals.lunch.names.len(), 8);
        assert!((9..=10).contains(&day.meals.dinner.names.len()));
    }
}
