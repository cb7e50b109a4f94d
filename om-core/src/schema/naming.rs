// Wire names are the camelCase form of the internal snake_case names; acronyms that the API spells
// in capitals (clusterIP, podIP, externalIPs) have to be overridden per field.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
