//! Static recommendation content referenced by the rule table.

use crate::models::FitnessLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplementSpec {
    pub name: &'static str,
    pub dosage: &'static str,
    pub timing: &'static str,
}

const fn supplement(name: &'static str, dosage: &'static str, timing: &'static str) -> SupplementSpec {
    SupplementSpec {
        name,
        dosage,
        timing,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseGuideline {
    pub aerobic: &'static str,
    pub strength: &'static str,
    pub flexibility: &'static str,
}

pub fn exercise_guideline(level: FitnessLevel) -> ExerciseGuideline {
    match level {
        FitnessLevel::Beginner => ExerciseGuideline {
            aerobic: "20-30 minutes, 3-4 times per week, low to moderate intensity",
            strength: "2 times per week, bodyweight exercises",
            flexibility: "10-15 minutes daily stretching",
        },
        FitnessLevel::Intermediate => ExerciseGuideline {
            aerobic: "30-45 minutes, 4-5 times per week, moderate intensity",
            strength: "2-3 times per week, resistance training",
            flexibility: "15-20 minutes daily stretching and mobility",
        },
        FitnessLevel::Advanced => ExerciseGuideline {
            aerobic: "45-60 minutes, 5-6 times per week, moderate to high intensity",
            strength: "3-4 times per week, progressive resistance training",
            flexibility: "20-30 minutes daily comprehensive mobility work",
        },
    }
}

pub const EXERCISE_FREQUENCY: &str = "Most days of the week";
pub const EXERCISE_DURATION: &str = "30-60 minutes";

pub const HYDRATION: &str =
    "Drink 8-10 glasses of water daily, include coconut water and buttermilk in summer";

pub const SLEEP: &[&str] = &[
    "Aim for 7-9 hours of quality sleep nightly",
    "Maintain consistent sleep and wake times",
    "Create a cool, dark, quiet sleeping environment",
    "Avoid screens 1 hour before bedtime",
];

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

pub const BASE_EMPHASIZE: &[&str] = &[
    "Green leafy vegetables (palak, methi, spinach)",
    "Lentils (moong dal, masoor dal, chana dal)",
    "Seasonal fruits (guava, papaya, apple)",
    "Whole grains (brown rice, bajra, jowar, ragi)",
    "Curd and buttermilk",
    "Turmeric, ginger, garlic",
];

pub const BASE_AVOID: &[&str] = &[
    "Deep fried foods (samosa, pakora, puri)",
    "Sweets and mithai",
    "Refined flour products (maida)",
    "Excessive salt and pickles",
    "Processed and packaged foods",
];

pub const BASE_STRESS: &[&str] = &[
    "Practice deep breathing exercises (10 minutes daily)",
    "Consider meditation or mindfulness apps",
    "Engage in regular physical activity",
    "Maintain social connections and hobbies",
];

pub const GENERAL_SUPPLEMENTS: &[SupplementSpec] = &[
    supplement("Vitamin D3", "1000-2000 IU daily", "with meals"),
    supplement("Multivitamin", "as directed", "with breakfast"),
    supplement("Probiotics", "10-50 billion CFU daily", "on empty stomach"),
    supplement("Vitamin B12", "1000 mcg daily", "with breakfast"),
];

// ---------------------------------------------------------------------------
// Glucose
// ---------------------------------------------------------------------------

pub const DIABETES_EMPHASIZE: &[&str] = &[
    "bitter gourd",
    "fenugreek leaves",
    "okra",
    "bottle gourd",
    "moong dal",
    "chana dal",
    "pearl millet",
    "finger millet",
    "Indian gooseberry",
    "black plum",
    "cinnamon",
];

pub const DIABETES_AVOID: &[&str] = &[
    "refined sugars",
    "white rice",
    "refined flour",
    "jaggery in excess",
    "sugary lassi",
    "mango in excess",
    "ripe banana",
    "potato",
];

pub const DIABETES_MEAL_TIPS: &[&str] = &[
    "Eat 5-6 small meals throughout the day",
    "Include protein in every meal (dal, paneer, curd)",
    "Reduce rice quantity, prefer roti (whole wheat bread)",
    "Walk for 10-15 minutes after meals",
];

pub const DIABETES_SUPPLEMENTS: &[SupplementSpec] = &[
    supplement("Chromium Picolinate", "200-400 mcg daily", "with meals"),
    supplement("Alpha-Lipoic Acid", "300-600 mg daily", "before meals"),
    supplement("Cinnamon Extract", "500-1000 mg daily", "with meals"),
];

// ---------------------------------------------------------------------------
// Heart and blood pressure
// ---------------------------------------------------------------------------

pub const CARDIO_EMPHASIZE: &[&str] = &[
    "garlic",
    "flaxseeds",
    "walnuts",
    "almonds",
    "fish",
    "green tea",
    "pomegranate",
    "oats",
    "barley",
];

pub const CARDIO_AVOID: &[&str] = &[
    "ghee in excess",
    "coconut oil in excess",
    "red meat",
    "organ meats",
    "full-fat dairy",
    "salty snacks",
];

pub const CARDIO_MEAL_TIPS: &[&str] = &[
    "Reduce salt intake - avoid pickles and papad",
    "Include fish 2-3 times per week",
    "Include flaxseeds and walnuts in diet",
];

pub const CARDIO_SUPPLEMENTS: &[SupplementSpec] = &[
    supplement("Omega-3 Fatty Acids", "1000-2000 mg daily", "with meals"),
    supplement("Coenzyme Q10", "100-200 mg daily", "with fat-containing meal"),
    supplement("Magnesium", "200-400 mg daily", "before bedtime"),
];

pub const HYPERTENSION_EMPHASIZE: &[&str] = &[
    "cucumber",
    "watermelon",
    "coconut water",
    "banana",
    "garlic",
    "holy basil",
    "steamed vegetables",
    "low-salt dal",
];

pub const HYPERTENSION_AVOID: &[&str] = &[
    "excess salt",
    "pickles",
    "papad",
    "salty snacks",
    "canned foods",
    "salted nuts",
    "alcohol",
];

// ---------------------------------------------------------------------------
// Weight
// ---------------------------------------------------------------------------

pub const WEIGHT_MEAL_TIPS: &[&str] = &[
    "Fill half your plate with vegetables",
    "Eat slowly and chew properly",
    "Have salad before main meal",
    "Reduce sugar and ghee intake",
    "Have early dinner",
];

// ---------------------------------------------------------------------------
// Warning signs
// ---------------------------------------------------------------------------

pub const IMMEDIATE_ATTENTION_SIGNS: &[&str] = &[
    "Chest pain or pressure",
    "Difficulty breathing",
    "Severe headache",
    "Blood pressure >180/110",
    "Blood glucose <70 or >400",
    "Loss of consciousness",
];

pub const URGENT_CONSULTATION_SIGNS: &[&str] = &[
    "Persistent fatigue",
    "Unexplained weight loss/gain",
    "Frequent urination and excessive thirst",
    "Blurred vision",
    "Slow-healing wounds",
    "Numbness or tingling in extremities",
];
