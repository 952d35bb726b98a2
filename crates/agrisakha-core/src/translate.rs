//! Dictionary translator for advisory strings.
//!
//! Translation is an exact-match lookup keyed by the English advisory text.
//! Anything not in the table, or any target other than `"Hindi"`, is
//! returned unchanged.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::HINDI;
use crate::rules::AdvisoryRules;

/// English advisory → (language name → translated text).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationTable {
    entries: BTreeMap<String, HashMap<String, String>>,
}

const BUILTIN_HINDI: &[(&str, &str)] = &[
    (
        "Common wheat diseases: Rust, Blight. Use Propiconazole fungicide. Ensure proper crop rotation and avoid waterlogging.",
        "गेहूं के सामान्य रोग: रतुआ, झुलसा। प्रोपिकोनाज़ोल कवकनाशी का उपयोग करें। उचित फसल चक्र अपनाएं और जलभराव से बचें।",
    ),
    (
        "Wheat fertilizer schedule: Basal dose - DAP 100kg/acre, Urea 50kg/acre. Top dressing at 21 days - Urea 50kg/acre.",
        "गेहूं उर्वरक अनुसूची: आधार खुराक - डीएपी 100 किग्रा/एकड़, यूरिया 50 किग्रा/एकड़। 21 दिन पर टॉप ड्रेसिंग - यूरिया 50 किग्रा/एकड़।",
    ),
    (
        "Wheat cultivation tips: Sow in November, use certified seeds, maintain 20cm row spacing. Expected yield: 20-25 quintals/acre.",
        "गेहूं की खेती के सुझाव: नवंबर में बुआई करें, प्रमाणित बीजों का उपयोग करें, 20 सेमी पंक्ति दूरी रखें। अपेक्षित उपज: 20-25 क्विंटल/एकड़।",
    ),
    (
        "Common rice diseases: Blast, Bacterial leaf blight. Use Tricyclazole for blast and avoid excess nitrogen.",
        "धान के सामान्य रोग: ब्लास्ट, जीवाणु पत्ती झुलसा। ब्लास्ट के लिए ट्राइसाइक्लाज़ोल का उपयोग करें और अधिक नाइट्रोजन से बचें।",
    ),
    (
        "Rice cultivation: Best time June-July, ensure proper water management",
        "धान की खेती: सबसे अच्छा समय जून-जुलाई, उचित जल प्रबंधन सुनिश्चित करें",
    ),
    (
        "Possible pest detected: Aphids, use Neem spray",
        "संभावित कीट पाया गया: एफिड्स, नीम स्प्रे का उपयोग करें",
    ),
    (
        "Use NPK 10:26:26 for better yield, apply according to soil test",
        "बेहतर उपज के लिए एनपीके 10:26:26 का उपयोग करें, मिट्टी परीक्षण के अनुसार डालें",
    ),
    (
        "Maintain proper irrigation schedule, avoid overwatering",
        "उचित सिंचाई कार्यक्रम बनाए रखें, अधिक पानी देने से बचें",
    ),
    (
        "Check weather forecast regularly, plan activities accordingly",
        "मौसम पूर्वानुमान नियमित रूप से देखें, उसी के अनुसार गतिविधियों की योजना बनाएं",
    ),
    (
        "Soil health: Test soil every 2-3 years, add organic compost and keep pH between 6.0 and 7.5.",
        "मिट्टी का स्वास्थ्य: हर 2-3 साल में मिट्टी की जांच कराएं, जैविक खाद डालें और पीएच 6.0 से 7.5 के बीच रखें।",
    ),
    (
        "Market prices: Check your nearest mandi or the eNAM portal for current rates before selling.",
        "बाज़ार भाव: बेचने से पहले अपनी नज़दीकी मंडी या ई-नाम पोर्टल पर मौजूदा दरें देखें।",
    ),
    (
        "Seed selection: Buy certified seeds from authorised dealers and treat them with fungicide before sowing.",
        "बीज चयन: अधिकृत विक्रेताओं से प्रमाणित बीज खरीदें और बुआई से पहले उन्हें कवकनाशी से उपचारित करें।",
    ),
    (
        "General advice: Maintain proper irrigation and soil testing.",
        "सामान्य सलाह: उचित सिंचाई और मिट्टी परीक्षण बनाए रखें।",
    ),
];

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hindi translations for every fixed advice in [`AdvisoryRules::builtin`].
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (en, hi) in BUILTIN_HINDI {
            table.insert(*en, HINDI, *hi);
        }
        table
    }

    pub fn insert(
        &mut self,
        text: impl Into<String>,
        language: impl Into<String>,
        translated: impl Into<String>,
    ) {
        self.entries
            .entry(text.into())
            .or_default()
            .insert(language.into(), translated.into());
    }

    pub fn get(&self, text: &str, language: &str) -> Option<&str> {
        self.entries
            .get(text)
            .and_then(|m| m.get(language))
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that no fixed advice in `rules` can produce.
    ///
    /// A non-empty result means the table and the rules have drifted apart
    /// and those translations will never be used.
    pub fn orphaned_keys<'a>(&'a self, rules: &AdvisoryRules) -> Vec<&'a str> {
        let outputs = rules.fixed_outputs();
        self.keys().filter(|k| !outputs.contains(k)).collect()
    }

    /// Fixed advice strings in `rules` that have no Hindi translation.
    pub fn untranslated<'r>(&self, rules: &'r AdvisoryRules) -> Vec<&'r str> {
        rules
            .fixed_outputs()
            .into_iter()
            .filter(|o| self.get(o, HINDI).is_none())
            .collect()
    }
}

/// Identity-by-default translator over an immutable [`TranslationTable`].
#[derive(Debug, Clone, Default)]
pub struct Translator {
    table: TranslationTable,
}

impl Translator {
    pub fn new(table: TranslationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// Translates `text` into `target_language`.
    ///
    /// Only `"Hindi"` is a translation target; every other language, and
    /// every text missing from the table, yields `text` itself.
    pub fn translate<'a>(&'a self, text: &'a str, target_language: &str) -> &'a str {
        if target_language != HINDI {
            return text;
        }
        match self.table.get(text, HINDI) {
            Some(t) if !t.is_empty() => t,
            _ => text,
        }
    }
}
