use serde::{Deserialize, Serialize};

/// Most liquid underlyings in the B3 options market.
pub const OPCOES_TOP_50: &[&str] = &[
    "PETR4", "VALE3", "BOVA11", "BBAS3", "ITUB4", "BBDC4", "B3SA3", "MGLU3", "SUZB3", "SBSP3",
    "EQTL3", "ABEV3", "RRRP3", "WEGE3", "PRIO3", "ELET3", "LREN3", "BPAC11", "RENT3", "PETZ3",
    "ALOS3", "GGBR4", "PETR3", "JBSS3", "IRBR3", "CSAN3", "ELET6", "BHIA3", "ITSA4", "SMAL11",
    "EMBR3", "EZTC3", "ARZZ3", "JHSF3", "CSNA3", "USIM5", "BEEF3", "BOVV11", "BBDC3", "COGN3",
    "BRFS3", "KLBN11", "BRAP4", "BRKM5", "VBBR3", "CMIG4", "CEAB3", "AZUL4", "CYRE3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Universe {
    #[default]
    #[serde(rename = "opcoes_top_50")]
    OpcoesTop50,
    Custom,
}

impl Universe {
    pub fn tickers(self) -> Vec<String> {
        match self {
            Self::OpcoesTop50 => OPCOES_TOP_50.iter().map(|t| t.to_string()).collect(),
            Self::Custom => Vec::new(),
        }
    }
}
