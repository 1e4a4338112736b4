use schemars::schema::RootSchema;

/// Names of the top-level properties of an object schema, in declaration
/// order. Tool inputs here are flat records of strings.
pub fn describe_parameters(parameters: &RootSchema) -> Vec<String> {
    let Some(object) = parameters.schema.object.as_ref() else {
        return Vec::new();
    };

    object.properties.keys().cloned().collect()
}
