use std::fmt;

/// Models available through OpenRouter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlModel {
    #[default]
    DeepseekV3,
    DeepseekR1_0528,
    DeepseekR1,
    KimiK2,
}

impl LlModel {
    pub const ALL: [LlModel; 4] = [
        LlModel::DeepseekV3,
        LlModel::DeepseekR1_0528,
        LlModel::DeepseekR1,
        LlModel::KimiK2,
    ];

    /// OpenRouter model identifier.
    pub fn id(self) -> &'static str {
        match self {
            LlModel::DeepseekV3 => "deepseek/deepseek-chat-v3-0324:free",
            LlModel::DeepseekR1_0528 => "deepseek/deepseek-r1-0528:free",
            LlModel::DeepseekR1 => "deepseek/deepseek-r1:free",
            LlModel::KimiK2 => "moonshotai/kimi-k2:free",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            LlModel::DeepseekV3 => "deepseek-v3",
            LlModel::DeepseekR1_0528 => "deepseek-r1-0528",
            LlModel::DeepseekR1 => "deepseek-r1",
            LlModel::KimiK2 => "kimi-k2",
        }
    }

    /// Accepts a short name or a full identifier. Anything else selects the
    /// default model.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.short_name() == name || m.id() == name)
            .unwrap_or_default()
    }
}

impl fmt::Display for LlModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
