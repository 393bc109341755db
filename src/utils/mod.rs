pub mod cypher_escaping;
