use std::fmt;

use mater_core::cards::{CARD_END, CARD_START};
use mater_core::{Catalog, Field, RecommendationProfile};

use crate::conversation::ChatRequest;

/// Per-field wording of the system prompt.
#[derive(Clone, Copy, Debug)]
pub struct FieldBrief {
    pub field: Field,
    pub role: &'static str,
    pub audience: &'static str,
    pub subject: &'static str,
    pub categories: &'static str,
    pub score_label: &'static str,
    pub co2_unit: &'static str,
    pub considerations: &'static str,
    /// Topics that count as on-topic for the session.
    pub scope: &'static str,
    pub clarifying_questions: &'static [&'static str],
}

pub const FIELD_BRIEFS: [FieldBrief; 4] = [
    FieldBrief {
        field: Field::Medicine,
        role: "an expert biomaterial recommendation assistant for medical applications",
        audience: "clinicians choose the best implant materials based on clinical cases",
        subject: "case",
        categories: "Metal, Polymer, Ceramic, Composite, Biosourced",
        score_label: "Clinical score",
        co2_unit: "kg CO2/kg",
        considerations: "biocompatibility, mechanical properties and environmental impact",
        scope: "medical implants, biomaterials, clinical cases, surgery, prosthetics, orthopedics",
        clarifying_questions: &[
            "Patient age and weight?",
            "Type of fracture or pathology (open, closed, comminuted)?",
            "Load-bearing requirements?",
            "Expected implant duration (temporary or permanent)?",
            "Any allergies or contraindications?",
            "Current material being used (if replacement)?",
        ],
    },
    FieldBrief {
        field: Field::Architecture,
        role: "an expert sustainable building material recommendation assistant",
        audience: "architects and builders choose optimal construction materials",
        subject: "scenario",
        categories: "Wood, Bio-based, Metal, Mineral, Natural",
        score_label: "Performance score",
        co2_unit: "kg CO2/m2",
        considerations: "structural integrity, thermal performance, lifecycle analysis and local availability",
        scope: "building materials, construction, insulation, structural design, facades",
        clarifying_questions: &[
            "Climate zone or geographic location?",
            "Building type (residential, commercial, industrial)?",
            "Specific performance requirements (thermal, acoustic, structural)?",
            "Budget constraints?",
            "Certification requirements (LEED, BREEAM, HQE)?",
            "Expected lifespan of the building?",
        ],
    },
    FieldBrief {
        field: Field::Mechanics,
        role: "an expert engineering material recommendation assistant",
        audience: "engineers select optimal materials for mechanical applications",
        subject: "challenge",
        categories: "Superalloy, Composite, Light Alloy, Steel, Ceramic, Bio-composite",
        score_label: "Performance score",
        co2_unit: "kg CO2/part",
        considerations: "operating conditions, fatigue life, thermal resistance and manufacturability",
        scope: "engineering materials, mechanical parts, turbines, engines, robotics, thermal systems",
        clarifying_questions: &[
            "Operating temperature range?",
            "Load type (static, dynamic, cyclic)?",
            "Required fatigue life (number of cycles)?",
            "Corrosion environment?",
            "Manufacturing constraints (machining, casting, 3D printing)?",
            "Weight limitations?",
        ],
    },
    FieldBrief {
        field: Field::Aerospace,
        role: "an expert aerospace material recommendation assistant",
        audience: "aerospace engineers select high-performance materials",
        subject: "application",
        categories: "Composite, Titanium, Light Alloy, Ceramic, Superalloy, Bio-composite",
        score_label: "Performance score",
        co2_unit: "kg CO2/kg",
        considerations: "weight-to-strength ratio, radiation resistance, thermal limits and certification requirements",
        scope: "aerospace materials, satellites, aircraft, rockets, fuselage, propulsion",
        clarifying_questions: &[
            "Operating altitude and environment (LEO, GEO, atmospheric)?",
            "Temperature range during operation?",
            "Radiation exposure level?",
            "Weight budget for the component?",
            "Certification standards (FAA, EASA, NASA)?",
            "Expected service life?",
        ],
    },
];

pub fn field_brief(field: Field) -> &'static FieldBrief {
    FIELD_BRIEFS.iter().find(|brief| brief.field == field).unwrap_or(&FIELD_BRIEFS[0])
}

/// Names the assistant may put in a card for `field`, in catalog order.
pub fn allowed_materials(catalog: &Catalog, field: Field) -> Vec<&str> {
    catalog.for_field(field).map(|material| material.name.as_str()).collect()
}

pub fn system_prompt(catalog: &Catalog, request: &ChatRequest) -> String {
    SystemPrompt { catalog, request }.to_string()
}

/// Renders the instructions for one chat turn.
struct SystemPrompt<'a> {
    catalog: &'a Catalog,
    request: &'a ChatRequest,
}

impl fmt::Display for SystemPrompt<'_> {
    fn fmt(&self, prompt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.request;
        let brief = field_brief(request.field);
        let field = request.field.label();
        let profiles = RecommendationProfile::ORDER;

        writeln!(prompt, "You are Mater, {}.", brief.role)?;
        writeln!(prompt, "You help {}.", brief.audience)?;
        writeln!(
            prompt,
            "For each {}, recommend exactly 3 materials with these profiles:",
            brief.subject
        )?;
        writeln!(
            prompt,
            "1. **{}** (or matching the user's optimization priority)",
            profiles[0].label()
        )?;
        writeln!(prompt, "2. **{}** (most sustainable option)", profiles[1].label())?;
        writeln!(prompt, "3. **{}** (best cost-effectiveness)", profiles[2].label())?;
        writeln!(prompt)?;
        prompt.write_str("For each material provide:\n")?;
        writeln!(prompt, "- Material name and category ({})", brief.categories)?;
        writeln!(prompt, "- {} (out of 10)", brief.score_label)?;
        prompt.write_str("- Sustainability score (out of 10)\n")?;
        writeln!(prompt, "- CO2 emissions ({})", brief.co2_unit)?;
        prompt.write_str("- Cost score (out of 10, higher = cheaper)\n")?;
        prompt.write_str("- Estimated CO2 savings vs conventional material\n\n")?;
        writeln!(prompt, "Consider {}.", brief.considerations)?;

        prompt.write_str("\nRULES YOU MUST FOLLOW WITHOUT EXCEPTION:\n\n")?;
        writeln!(
            prompt,
            "0. CLARIFICATION FIRST: if the request lacks important details, ask 2-4 targeted \
             clarifying questions before recommending materials. Do not include {CARD_START} \
             blocks when asking for clarification."
        )?;
        prompt.write_str("   Examples of clarifying questions:\n")?;
        for question in brief.clarifying_questions {
            writeln!(prompt, "   - {question}")?;
        }
        prompt.write_str(
            "   Only provide the 3 material cards once you have enough context. If the message is \
             already detailed and specific, skip clarification.\n\n",
        )?;

        writeln!(
            prompt,
            "1. FIELD VALIDATION: this is a \"{field}\" session. Only answer questions about {}.",
            brief.scope
        )?;
        prompt.write_str(
            "   - If the question belongs to a different field, do not answer. Respond only with:\n     \
             \"This question seems related to a different domain. Please create a new chat session \
             and select the appropriate field to get accurate recommendations.\"\n",
        )?;
        writeln!(
            prompt,
            "   - If the question is unrelated to materials, respond only with:\n     \
             \"I can only help with {field} material recommendations. Please describe a specific \
             {field} case or scenario.\""
        )?;
        prompt.write_str("   - In both cases, do not include any card blocks.\n\n")?;

        prompt.write_str(
            "2. CARD FORMAT: when the question is on-topic and you have enough information, output \
             exactly 3 cards in this exact format:\n",
        )?;
        writeln!(prompt, "{CARD_START}")?;
        prompt.write_str(
            "name: Material Name Here\ncategory: Category Here\nscore: 8.5\nsustainability: 7.2\n\
             co2: 12.5\ncost: 6\nco2Saved: -5.3\n",
        )?;
        writeln!(prompt, "profile: {}", profiles[0].label())?;
        writeln!(prompt, "{CARD_END}")?;
        writeln!(
            prompt,
            "   - \"profile\" must be one of: {}",
            profiles.iter().map(|p| format!("\"{}\"", p.label())).collect::<Vec<_>>().join(", ")
        )?;
        prompt.write_str("   - Do not add extra fields and do not write scores as \"9.5/10\".\n")?;
        prompt.write_str(
            "   - co2Saved is negative when the material saves CO2 vs the baseline.\n\n",
        )?;
        prompt.write_str(
            "3. The text before the cards is a brief analysis (2-3 sentences max).\n\n",
        )?;

        prompt.write_str("ALLOWED MATERIALS:\n")?;
        prompt.write_str(
            "Only recommend materials from this list. Do not invent materials that are not listed.\n",
        )?;
        writeln!(prompt, "Available materials for {field}:")?;
        for (index, name) in allowed_materials(self.catalog, request.field).iter().enumerate() {
            writeln!(prompt, "{}. {name}", index + 1)?;
        }
        prompt.write_str(
            "\nUse the EXACT names as written above in your card blocks. If nothing in the list fits, \
             explain why and recommend the closest match from the list.\n\n",
        )?;

        writeln!(prompt, "User specialty: {}", request.specialty())?;
        writeln!(prompt, "Optimization priority: {}", request.optimization())?;
        prompt.write_str("Always respond in the same language as the user's message.")
    }
}

#[cfg(test)]
mod tests {
    use mater_core::{Catalog, Field};

    use super::{allowed_materials, field_brief, system_prompt, FIELD_BRIEFS};
    use crate::conversation::{ChatMessage, ChatRequest};

    fn request(field: Field) -> ChatRequest {
        ChatRequest::new(field, vec![ChatMessage::user("Femoral stem for a 70 year old")])
    }

    #[test]
    fn every_field_has_a_brief() {
        for field in Field::ALL {
            assert_eq!(field_brief(field).field, field);
        }
        assert_eq!(FIELD_BRIEFS.len(), Field::ALL.len());
    }

    #[test]
    fn prompt_lists_allowed_materials_for_the_session_field() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        let prompt = system_prompt(&catalog, &request(Field::Medicine));

        assert!(prompt.starts_with("You are Mater, an expert biomaterial"));
        assert!(prompt.contains("Available materials for Medicine:"));
        assert!(prompt.contains("1. Titanium Grade 5 (Ti-6Al-4V CNC)"));
        assert!(prompt.contains("---CARD---\nname: Material Name Here"));
        assert!(prompt.contains("\"Best Overall\", \"Ecological Profile\", \"Economic Profile\""));
        for name in allowed_materials(&catalog, Field::Medicine) {
            assert!(prompt.contains(name), "missing {name}");
        }
    }

    #[test]
    fn prompt_uses_defaults_for_missing_specialty_and_priority() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        let prompt = system_prompt(&catalog, &request(Field::Aerospace));

        assert!(prompt.contains("User specialty: General\n"));
        assert!(prompt.contains("Optimization priority: Most Optimal\n"));
        assert!(prompt.ends_with("same language as the user's message."));
        assert!(prompt.contains("Operating altitude and environment"));
    }

    #[test]
    fn prompt_carries_caller_specialty_and_priority() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        let mut request = request(Field::Architecture);
        request.specialty = Some("Facade engineering".to_string());
        request.optimization = Some("Lowest Carbon".to_string());

        let prompt = system_prompt(&catalog, &request);
        assert!(prompt.contains("User specialty: Facade engineering"));
        assert!(prompt.contains("Optimization priority: Lowest Carbon"));
        assert!(prompt.contains("this is a \"Architecture\" session"));
    }

    #[test]
    fn allowed_lists_differ_between_fields() {
        let catalog = Catalog::bundled().expect("bundled catalog");
        let medicine = allowed_materials(&catalog, Field::Medicine);
        let aerospace = allowed_materials(&catalog, Field::Aerospace);

        assert!(!medicine.is_empty());
        assert!(!aerospace.is_empty());
        assert_ne!(medicine, aerospace);
    }
}
