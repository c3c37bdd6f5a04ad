use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::known;
use crate::lang::Type;
use crate::naming::upper_first;

/// Color names accepted next to hex notation.
pub const KNOWN_COLORS: &[&str] = &[
    "Transparent", "AliceBlue", "AntiqueWhite", "Aqua", "Aquamarine", "Azure", "Beige",
    "Bisque", "Black", "BlanchedAlmond", "Blue", "BlueViolet", "Brown", "BurlyWood",
    "CadetBlue", "Chartreuse", "Chocolate", "Coral", "CornflowerBlue", "Cornsilk", "Crimson",
    "Cyan", "DarkBlue", "DarkCyan", "DarkGoldenRod", "DarkGray", "DarkGreen", "DarkKhaki",
    "DarkMagenta", "DarkOliveGreen", "DarkOrange", "DarkOrchid", "DarkRed", "DarkSalmon",
    "DarkSeaGreen", "DarkSlateBlue", "DarkSlateGray", "DarkTurquoise", "DarkViolet", "DeepPink",
    "DeepSkyBlue", "DimGray", "DodgerBlue", "FireBrick", "FloralWhite", "ForestGreen",
    "Fuchsia", "Gainsboro", "GhostWhite", "Gold", "GoldenRod", "Gray", "Green", "GreenYellow",
    "HoneyDew", "HotPink", "IndianRed", "Indigo", "Ivory", "Khaki", "Lavender", "LavenderBlush",
    "LawnGreen", "LemonChiffon", "LightBlue", "LightCoral", "LightCyan", "LightGoldenRodYellow",
    "LightGray", "LightGreen", "LightPink", "LightSalmon", "LightSeaGreen", "LightSkyBlue",
    "LightSlateGray", "LightSteelBlue", "LightYellow", "Lime", "LimeGreen", "Linen", "Magenta",
    "Maroon", "MediumAquaMarine", "MediumBlue", "MediumOrchid", "MediumPurple",
    "MediumSeaGreen", "MediumSlateBlue", "MediumSpringGreen", "MediumTurquoise",
    "MediumVioletRed", "MidnightBlue", "MintCream", "MistyRose", "Moccasin", "NavajoWhite",
    "Navy", "OldLace", "Olive", "OliveDrab", "Orange", "OrangeRed", "Orchid", "PaleGoldenRod",
    "PaleGreen", "PaleTurquoise", "PaleVioletRed", "PapayaWhip", "PeachPuff", "Peru", "Pink",
    "Plum", "PowderBlue", "Purple", "Red", "RosyBrown", "RoyalBlue", "SaddleBrown", "Salmon",
    "SandyBrown", "SeaGreen", "SeaShell", "Sienna", "Silver", "SkyBlue", "SlateBlue",
    "SlateGray", "Snow", "SpringGreen", "SteelBlue", "Tan", "Teal", "Thistle", "Tomato",
    "Turquoise", "Violet", "Wheat", "White", "WhiteSmoke", "Yellow", "YellowGreen",
];

pub const LAYOUT_NAMES: [&str; 5] = [
    "StackLayout",
    "GridLayout",
    "AbsoluteLayout",
    "DockLayout",
    "WrapLayout",
];

const STRING_TYPES: [&str; 10] = [
    "string",
    "style",
    r#""text/formatted-string".FormattedString"#,
    r#""ui/styling".Style"#,
    "Date",
    "Array",
    r#""ui/page".OptionsMenu"#,
    r#""ui/action-bar".NavigationButton"#,
    r#""ui/action-bar".ActionItems"#,
    r#""ui/page".Page"#,
];

const HEX_COLOR: &str = "HexColor";
const BINDING_VALIDATOR: &str = "BindingValidator";

/// The facets of an `xs:restriction`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Restriction {
    pub base: Option<String>,
    pub pattern: Option<String>,
    pub white_space: Option<String>,
    pub enum_values: Option<Vec<String>>,
}

impl Restriction {
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            ..Self::default()
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn white_space(mut self, white_space: impl Into<String>) -> Self {
        self.white_space = Some(white_space.into());
        self
    }

    pub fn enumeration<S: ToString>(mut self, values: &[S]) -> Self {
        self.enum_values = Some(values.iter().map(ToString::to_string).collect());
        self
    }
}

/// A named simple type constraining attribute values of one source type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validator {
    pub validated_type: Type,
    /// Names of the validators this one is a union with.
    pub union_member_types: Option<Vec<String>>,
    pub restriction: Option<Restriction>,
}

impl Validator {
    pub fn new(
        validated_type: Type,
        union_member_types: Option<Vec<String>>,
        restriction: Option<Restriction>,
    ) -> Self {
        Self {
            validated_type,
            union_member_types,
            restriction,
        }
    }

    pub fn name(&self) -> String {
        format!(
            "{}Validator",
            upper_first(self.validated_type.name().unwrap_or_default())
        )
    }
}

/// The validators the registry knows how to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuiltinValidator {
    Binding,
    String,
    Number,
    Boolean,
    Color,
    HexColor,
    Layout,
}

impl BuiltinValidator {
    pub fn for_type(full_name: &str) -> Option<Self> {
        match full_name {
            known::BINDING => Some(Self::Binding),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            known::COLOR => Some(Self::Color),
            HEX_COLOR => Some(Self::HexColor),
            known::LAYOUT => Some(Self::Layout),
            name if STRING_TYPES.contains(&name) => Some(Self::String),
            _ => None,
        }
    }

    /// Validators referenced by this one's union that must be declared as well.
    fn dependencies(self) -> &'static [BuiltinValidator] {
        match self {
            Self::Color => &[Self::HexColor],
            _ => &[],
        }
    }

    pub fn create(self) -> Validator {
        let binding = || Some(vec![BINDING_VALIDATOR.to_owned()]);
        match self {
            Self::Binding => Validator::new(
                Type::new(known::BINDING),
                None,
                Some(
                    Restriction::with_base("xs:string")
                        .pattern(r"\{\{.*?\}\}")
                        .white_space("collapse"),
                ),
            ),
            Self::String => Validator::new(
                Type::new("string"),
                binding(),
                Some(Restriction::with_base("xs:string")),
            ),
            Self::Number => Validator::new(
                Type::new("number"),
                binding(),
                Some(Restriction::with_base("xs:integer")),
            ),
            Self::Boolean => Validator::new(
                Type::new("boolean"),
                binding(),
                Some(Restriction::with_base("xs:boolean")),
            ),
            Self::Color => Validator::new(
                Type::new(known::COLOR),
                Some(vec![
                    BINDING_VALIDATOR.to_owned(),
                    Self::HexColor.create().name(),
                ]),
                Some(Restriction::with_base("xs:string").enumeration(KNOWN_COLORS)),
            ),
            Self::HexColor => Validator::new(
                Type::new(HEX_COLOR),
                None,
                Some(
                    Restriction::with_base("xs:string").pattern("#[0-9a-fA-F]{3}([0-9a-fA-F]{3})?"),
                ),
            ),
            Self::Layout => Validator::new(
                Type::new(known::LAYOUT),
                binding(),
                Some(Restriction::with_base("xs:string").enumeration(&LAYOUT_NAMES)),
            ),
        }
    }
}

/// Creates each validator once and remembers which type it was created for.
#[derive(Debug)]
pub struct ValidatorRegistry {
    validators: Vec<Validator>,
    by_type: HashMap<String, usize>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// A registry holding the binding validator.
    pub fn new() -> Self {
        let mut registry = Self {
            validators: Vec::new(),
            by_type: HashMap::new(),
        };
        let index = registry.register(BuiltinValidator::Binding);
        registry.by_type.insert(known::BINDING.to_owned(), index);
        registry
    }

    pub fn get_validator(&mut self, type_: &Type) -> Result<&Validator, Error> {
        let full_name = type_
            .full_name()
            .ok_or_else(|| Error::UnmappedType("<unnamed>".to_owned()))?;
        let index = match self.by_type.get(full_name) {
            Some(&index) => index,
            None => {
                let builtin = BuiltinValidator::for_type(full_name)
                    .ok_or_else(|| Error::UnmappedType(full_name.to_owned()))?;
                let index = self.register(builtin);
                self.by_type.insert(full_name.to_owned(), index);
                index
            }
        };
        Ok(&self.validators[index])
    }

    /// Every distinct validator, in registration order.
    pub fn registered_validators(&self) -> &[Validator] {
        &self.validators
    }

    fn register(&mut self, builtin: BuiltinValidator) -> usize {
        for dependency in builtin.dependencies() {
            self.register(*dependency);
        }
        let validator = builtin.create();
        let name = validator.name();
        if let Some(index) = self.validators.iter().position(|v| v.name() == name) {
            return index;
        }
        debug!(validator = %name, "registered validator");
        self.validators.push(validator);
        self.validators.len() - 1
    }
}
