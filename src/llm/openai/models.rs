use std::fmt::{self, Display};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpenAIModel {
    Gpt4o,
    #[default]
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
}

impl Display for OpenAIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenAIModel::Gpt4o => write!(f, "gpt-4o"),
            OpenAIModel::Gpt4oMini => write!(f, "gpt-4o-mini"),
            OpenAIModel::Gpt41 => write!(f, "gpt-4.1"),
            OpenAIModel::Gpt41Mini => write!(f, "gpt-4.1-mini"),
        }
    }
}

impl From<OpenAIModel> for String {
    fn from(val: OpenAIModel) -> Self {
        val.to_string()
    }
}
