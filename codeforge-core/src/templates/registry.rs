//! The three built-in templates, reproduced from `config/project_templates.py` with their real
//! config-file bodies rather than placeholders.

use crate::model::ProgrammingLanguage;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A node in a template's directory structure: either a subdirectory or a leaf file with a
/// placeholder body.
#[derive(Debug, Clone)]
pub enum Node {
    Dir(Vec<(&'static str, Node)>),
    File(&'static str),
}

#[derive(Debug, Clone)]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub language: ProgrammingLanguage,
    pub structure: Vec<(&'static str, Node)>,
    /// `filename -> body`, filenames may contain `/` for nested paths (e.g. `.github/workflows/ci.yml`).
    pub config_files: Vec<(&'static str, &'static str)>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TemplateMetadata {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub language: ProgrammingLanguage,
}

fn fastapi_template() -> Template {
    Template {
        key: "fastapi",
        name: "FastAPI REST API",
        description: "FastAPI REST API with SQLAlchemy models, Pydantic schemas, and pytest",
        language: ProgrammingLanguage::Python,
        structure: vec![(
            "src",
            Node::Dir(vec![
                ("main.py", Node::File("# Main FastAPI app\n")),
                ("models.py", Node::File("# SQLAlchemy models\n")),
                ("schemas.py", Node::File("# Pydantic schemas\n")),
                ("database.py", Node::File("# Database config\n")),
                ("crud.py", Node::File("# CRUD operations\n")),
                ("config.py", Node::File("# Configuration\n")),
            ]),
        ), (
            "tests",
            Node::Dir(vec![
                ("test_main.py", Node::File("# Main API tests\n")),
                ("conftest.py", Node::File("# Pytest fixtures\n")),
            ]),
        )],
        config_files: vec![
            (".gitignore", "__pycache__/\n*.py[cod]\n*$py.class\n*.so\n.venv/\nvenv/\nenv/\n.env\n.env.local\n.DS_Store\n"),
            ("requirements.txt", "fastapi==0.104.1\nuvicorn==0.24.0\nsqlalchemy==2.0.23\npydantic==2.5.0\npython-dotenv==1.0.0\npytest==7.4.3\npytest-asyncio==0.21.1\nhttpx==0.25.1\n"),
            ("Dockerfile", "FROM python:3.11-slim\nWORKDIR /app\nCOPY requirements.txt .\nRUN pip install --no-cache-dir -r requirements.txt\nCOPY . .\nCMD [\"uvicorn\", \"src.main:app\", \"--host\", \"0.0.0.0\", \"--port\", \"8000\"]\n"),
            (".github/workflows/ci.yml", "name: CI\non: [push, pull_request]\njobs:\n  test:\n    runs-on: ubuntu-latest\n    steps:\n      - uses: actions/checkout@v3\n      - uses: actions/setup-python@v4\n        with:\n          python-version: \"3.11\"\n      - run: pip install -r requirements.txt\n      - run: pytest\n"),
            ("README.md", "# FastAPI Application\n\n## Setup\n```bash\npython -m venv venv\nsource venv/bin/activate  # On Windows: venv\\Scripts\\activate\npip install -r requirements.txt\n```\n\n## Run\n```bash\nuvicorn src.main:app --reload\n```\n\n## Test\n```bash\npytest\n```\n"),
        ],
    }
}

fn spring_boot_template() -> Template {
    Template {
        key: "spring_boot",
        name: "Spring Boot REST API",
        description: "Spring Boot REST API with JPA and basic CRUD operations",
        language: ProgrammingLanguage::Java,
        structure: vec![(
            "src/main/java/com/example",
            Node::Dir(vec![
                ("controller", Node::File("// REST controllers\n")),
                ("service", Node::File("// Business logic\n")),
                ("model", Node::File("// JPA entities\n")),
                ("repository", Node::File("// Data access\n")),
                ("config", Node::File("// Configuration classes\n")),
            ]),
        ), (
            "src/main/resources",
            Node::Dir(vec![("application.yml", Node::File("# Spring config\n"))]),
        ), (
            "src/test/java/com/example",
            Node::Dir(vec![
                ("controller", Node::File("// Controller tests\n")),
                ("service", Node::File("// Service tests\n")),
            ]),
        )],
        config_files: vec![
            ("pom.xml", POM_XML),
            ("Dockerfile", "FROM maven:3.9.5-eclipse-temurin-21 as builder\nWORKDIR /app\nCOPY . .\nRUN mvn clean package -DskipTests\nFROM eclipse-temurin:21-jre\nCOPY --from=builder /app/target/*.jar app.jar\nENTRYPOINT [\"java\", \"-jar\", \"app.jar\"]\n"),
            ("docker-compose.yml", "version: \"3.8\"\nservices:\n  mysql:\n    image: mysql:8.0\n    environment:\n      MYSQL_ROOT_PASSWORD: root\n      MYSQL_DATABASE: appdb\n    ports:\n      - \"3306:3306\"\n  app:\n    build: .\n    environment:\n      SPRING_DATASOURCE_URL: jdbc:mysql://mysql:3306/appdb\n      SPRING_DATASOURCE_USERNAME: root\n      SPRING_DATASOURCE_PASSWORD: root\n    ports:\n      - \"8080:8080\"\n    depends_on:\n      - mysql\n"),
            (".gitignore", "target/\n.mvn/\nmvnw\nmvnw.cmd\n*.jar\n*.class\n.DS_Store\n.idea/\n*.iml\n"),
            ("README.md", "# Spring Boot Microservice\n\n## Build\n```bash\nmvn clean package\n```\n\n## Run\n```bash\njava -jar target/microservice-1.0.0.jar\n```\n\n## Docker\n```bash\ndocker-compose up\n```\n"),
        ],
    }
}

const POM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0
         http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-starter-parent</artifactId>
        <version>3.1.5</version>
        <relativePath/>
    </parent>
    <groupId>com.example</groupId>
    <artifactId>microservice</artifactId>
    <version>1.0.0</version>
    <dependencies>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-web</artifactId>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-data-jpa</artifactId>
        </dependency>
        <dependency>
            <groupId>org.mariadb.jdbc</groupId>
            <artifactId>mariadb-java-client</artifactId>
            <version>3.1.4</version>
        </dependency>
        <dependency>
            <groupId>io.jsonwebtoken</groupId>
            <artifactId>jjwt-api</artifactId>
            <version>0.12.3</version>
        </dependency>
        <dependency>
            <groupId>org.springframework.boot</groupId>
            <artifactId>spring-boot-starter-test</artifactId>
            <scope>test</scope>
        </dependency>
    </dependencies>
    <build>
        <plugins>
            <plugin>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-maven-plugin</artifactId>
            </plugin>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-compiler-plugin</artifactId>
                <version>3.8.1</version>
                <configuration>
                    <source>21</source>
                    <target>21</target>
                    <forceJavacCompilerUse>true</forceJavacCompilerUse>
                </configuration>
            </plugin>
        </plugins>
    </build>
</project>
"#;

fn python_package_template() -> Template {
    Template {
        key: "python_package",
        name: "Python Package",
        description: "Generic Python package with setup.py, pytest, and documentation",
        language: ProgrammingLanguage::Python,
        structure: vec![(
            "src",
            Node::Dir(vec![
                ("main.py", Node::File("# Main module\n")),
                ("utils.py", Node::File("# Utility functions\n")),
                ("__init__.py", Node::File("# Package init\n")),
            ]),
        ), (
            "tests",
            Node::Dir(vec![
                ("test_main.py", Node::File("# Main tests\n")),
                ("conftest.py", Node::File("# Test config\n")),
                ("__init__.py", Node::File("")),
            ]),
        ), (
            "docs",
            Node::Dir(vec![("index.md", Node::File("# Documentation\n"))]),
        )],
        config_files: vec![
            ("setup.py", "from setuptools import setup, find_packages\n\nsetup(\n    name=\"mypackage\",\n    version=\"0.1.0\",\n    description=\"A Python package\",\n    packages=find_packages(where=\"src\"),\n    package_dir={\"\": \"src\"},\n    python_requires=\">=3.9\",\n    install_requires=[],\n    extras_require={\n        \"dev\": [\"pytest>=7.0\", \"black\", \"flake8\"],\n    },\n)\n"),
            ("pyproject.toml", "[build-system]\nrequires = [\"setuptools>=65\", \"wheel\"]\nbuild-backend = \"setuptools.build_meta\"\n\n[project]\nname = \"mypackage\"\nversion = \"0.1.0\"\ndescription = \"A Python package\"\nrequires-python = \">=3.9\"\ndependencies = []\n\n[project.optional-dependencies]\ndev = [\"pytest>=7.0\", \"black\", \"flake8\"]\n"),
            ("requirements.txt", "pytest>=7.0\nblack>=23.0\nflake8>=6.0\n"),
            (".gitignore", "__pycache__/\n*.py[cod]\n*.egg-info/\ndist/\nbuild/\n.venv/\nvenv/\n.DS_Store\n"),
            ("README.md", "# My Python Package\n\n## Installation\n```bash\npip install -e .\n```\n\n## Development\n```bash\npip install -e \".[dev]\"\npytest\n```\n"),
        ],
    }
}

static TEMPLATES: Lazy<HashMap<&'static str, Template>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tpl in [fastapi_template(), spring_boot_template(), python_package_template()] {
        map.insert(tpl.key, tpl);
    }
    map
});

/// Template keys grouped by category, mirroring `TEMPLATE_CATEGORIES`.
pub fn categories() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![("web", vec!["fastapi"]), ("backend", vec!["spring_boot"]), ("library", vec!["python_package"])]
}

pub fn get_template(name: &str) -> Option<&'static Template> {
    TEMPLATES.get(name)
}

pub fn list_templates() -> Vec<TemplateMetadata> {
    let mut metadata: Vec<TemplateMetadata> = TEMPLATES
        .values()
        .map(|t| TemplateMetadata { key: t.key, name: t.name, description: t.description, language: t.language })
        .collect();
    metadata.sort_by_key(|m| m.key);
    metadata
}

pub fn templates_for_language(language: ProgrammingLanguage) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> =
        TEMPLATES.values().filter(|t| t.language == language).map(|t| t.key).collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_built_in_templates_are_registered() {
        let names: Vec<_> = list_templates().into_iter().map(|m| m.key).collect();
        assert!(names.contains(&"fastapi"));
        assert!(names.contains(&"spring_boot"));
        assert!(names.contains(&"python_package"));
    }

    #[test]
    fn templates_for_language_filters_correctly() {
        let python = templates_for_language(ProgrammingLanguage::Python);
        assert!(python.contains(&"fastapi"));
        assert!(python.contains(&"python_package"));
        assert!(!python.contains(&"spring_boot"));
    }
}
