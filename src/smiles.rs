use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IonType {
    Anion,
    Cation,
    Neutral,
}

/// Kind of model a SMILES string asks for, by its number of fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelType {
    /// A single fragment.
    General,
    /// Two fragments carrying opposite charges.
    Ionic,
    Invalid,
}

/// A `-` anywhere makes an anion, checked before `+`.
pub fn ion_type(smiles: &str) -> IonType {
    if smiles.contains('-') {
        IonType::Anion
    } else if smiles.contains('+') {
        IonType::Cation
    } else {
        IonType::Neutral
    }
}

pub fn model_type(smiles: &str) -> ModelType {
    match smiles.matches('.').count() {
        0 => ModelType::General,
        1 => {
            let mut has_plus = false;
            let mut has_minus = false;
            for fragment in smiles.split('.') {
                has_plus |= fragment.contains('+');
                has_minus |= fragment.contains('-');
                if has_plus && has_minus {
                    return ModelType::Ionic;
                }
            }
            ModelType::Invalid
        }
        _ => ModelType::Invalid,
    }
}
