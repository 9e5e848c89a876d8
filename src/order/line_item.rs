use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::prompt::{PromptError, Prompter, TEXT_CHAR_LIMIT};

/// Whether beans ship whole or pre-ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrindType {
    WholeBean,
    Ground,
}

impl GrindType {
    pub const ALL: [GrindType; 2] = [GrindType::WholeBean, GrindType::Ground];

    /// Label shown in the grind type picker.
    pub fn label(self) -> &'static str {
        match self {
            GrindType::WholeBean => "Whole Bean (I'll grind it myself)",
            GrindType::Ground => "Ground (We'll grind it for you)",
        }
    }
}

/// Preparation style, used to pick a roast and grind profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewingMethod {
    Espresso,
    Moka,
    V60,
    FrenchPress,
    PourOver,
    Drip,
    ColdBrew,
}

impl BrewingMethod {
    pub const ALL: [BrewingMethod; 7] = [
        BrewingMethod::Espresso,
        BrewingMethod::Moka,
        BrewingMethod::V60,
        BrewingMethod::FrenchPress,
        BrewingMethod::PourOver,
        BrewingMethod::Drip,
        BrewingMethod::ColdBrew,
    ];

    /// Human readable name, e.g. `French Press`.
    pub fn display(self) -> &'static str {
        match self {
            BrewingMethod::Espresso => "Espresso",
            BrewingMethod::Moka => "Moka Pot",
            BrewingMethod::V60 => "V60 Pour Over",
            BrewingMethod::FrenchPress => "French Press",
            BrewingMethod::PourOver => "Pour Over",
            BrewingMethod::Drip => "Drip Coffee",
            BrewingMethod::ColdBrew => "Cold Brew",
        }
    }

    /// Grind size we use for this method.
    pub fn grind_description(self) -> &'static str {
        match self {
            BrewingMethod::Espresso => "very fine",
            BrewingMethod::Moka => "fine-medium",
            BrewingMethod::V60 | BrewingMethod::PourOver | BrewingMethod::Drip => "medium",
            BrewingMethod::FrenchPress => "coarse",
            BrewingMethod::ColdBrew => "extra coarse",
        }
    }

    /// Picker label. Grind sizes only matter when we do the grinding.
    pub fn label_for(self, grind: GrindType) -> String {
        match grind {
            GrindType::WholeBean => self.display().to_string(),
            GrindType::Ground => format!("{} ({} grind)", self.display(), self.grind_description()),
        }
    }
}

impl fmt::Display for BrewingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// One (quantity, grind, brew, notes) unit of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity_kg: u32,
    pub grind_type: GrindType,
    pub brewing_method: BrewingMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Collects grind type, brewing method and notes for one allocation.
pub struct LineItemBuilder<'a, P: Prompter> {
    prompter: &'a mut P,
}

impl<'a, P: Prompter> LineItemBuilder<'a, P> {
    pub fn new(prompter: &'a mut P) -> Self {
        Self { prompter }
    }

    /// Prompt for every attribute of a `quantity_kg` line item.
    ///
    /// Cancelling the grind or brew question aborts with
    /// [`OrderError::Cancelled`]. Cancelling the notes question just
    /// leaves the notes empty.
    pub fn build(&mut self, quantity_kg: u32) -> Result<LineItem, OrderError> {
        let grind_type = self.select_grind_type()?;
        let brewing_method = self.select_brewing_method(grind_type)?;
        let notes = self.ask_notes()?;

        Ok(LineItem {
            quantity_kg,
            grind_type,
            brewing_method,
            notes,
        })
    }

    /// Ask whole bean or ground.
    pub fn select_grind_type(&mut self) -> Result<GrindType, OrderError> {
        let options: Vec<String> = GrindType::ALL.iter().map(|g| g.label().to_string()).collect();
        let idx = self.prompter.prompt_select("Grind type", &options)?;
        Ok(GrindType::ALL[idx])
    }

    /// Ask the brewing method; the labels depend on `grind`.
    pub fn select_brewing_method(&mut self, grind: GrindType) -> Result<BrewingMethod, OrderError> {
        let options: Vec<String> = BrewingMethod::ALL
            .iter()
            .map(|m| m.label_for(grind))
            .collect();
        let label = match grind {
            GrindType::WholeBean => "Select your brewing method",
            GrindType::Ground => "Select your brewing method (grind size shown)",
        };
        let idx = self.prompter.prompt_select(label, &options)?;
        Ok(BrewingMethod::ALL[idx])
    }

    fn ask_notes(&mut self) -> Result<Option<String>, OrderError> {
        let answer = self.prompter.prompt_text(
            "Notes for this coffee (optional)",
            "e.g. lighter roast if possible",
            "Anything our roasters should know about this preference.",
            true,
        );
        let text = match answer {
            Ok(text) => text,
            Err(PromptError::Cancelled) => return Ok(None),
            Err(PromptError::Io(e)) => return Err(OrderError::Prompt(e)),
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(text.chars().take(TEXT_CHAR_LIMIT).collect()))
    }
}
