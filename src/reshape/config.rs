/// Configuration for reshaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapeConfig {
    /// Whether an output key also acts as a hint for the leaves below it,
    /// and names the container a composite field descends into first
    pub schema_keys_as_hints: bool,

    /// Whether the property chosen for a leaf in one array element is
    /// preferred for the same leaf in later elements
    pub pin_array_keys: bool,

    /// Whether an array template may wrap a single match of its inner
    /// schema when no container yields a proper array
    pub single_element_backoff: bool,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            schema_keys_as_hints: true,
            pin_array_keys: true,
            single_element_backoff: true,
        }
    }
}
