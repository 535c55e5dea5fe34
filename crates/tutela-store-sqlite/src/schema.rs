//! SQL schema for the Tutela SQLite store.
//!
//! Table and column names are the ones the case-record clients read back
//! verbatim. Keys are plain `INTEGER PRIMARY KEY`s assigned by the store,
//! never `AUTOINCREMENT`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS Conselheiro (
    idConselheiro      INTEGER PRIMARY KEY,
    nomeConselheiro    TEXT,
    cargo              TEXT,            -- 'secretario' | 'conselheiro'
    cpf                TEXT,
    rg                 TEXT,
    data_nascimento    TEXT,
    endereco           TEXT,
    contatoConselheiro TEXT,            -- '(DDD) numero'
    nacionalidade      TEXT,
    iniMandato         TEXT,
    fimMandato         TEXT
);

CREATE TABLE IF NOT EXISTS DireitoViolado (
    idDireitoViolado INTEGER PRIMARY KEY,
    Descricao        TEXT
);

-- Observacao holds a JSON object with the fields that have no column.
CREATE TABLE IF NOT EXISTS Denuncia (
    nrDenuncia        INTEGER PRIMARY KEY,
    DescricaoFato     TEXT,
    Data              TEXT,
    TipoDenuncia      TEXT,
    PessoalEnfEntrada INTEGER NOT NULL DEFAULT 0,
    idConselheiro     INTEGER,
    Data_averiguacao  TEXT,
    Observacao        TEXT
);

CREATE TABLE IF NOT EXISTS Atendimento (
    idAtendimento    INTEGER PRIMARY KEY,
    Data             TEXT,
    Hora             TEXT,
    Relato           TEXT,
    idDireitoViolado INTEGER
);

-- `assinatura` is the second-notice text, not a signature.
CREATE TABLE IF NOT EXISTS Notificacao (
    id               INTEGER PRIMARY KEY,
    redator          TEXT,
    assinatura       TEXT,
    idConselheiro    INTEGER,
    idSecretario     INTEGER,
    idMedida_idMaior INTEGER,
    dataNotificacao  TEXT,
    horaNotificacao  TEXT
);

CREATE TABLE IF NOT EXISTS medida_aplicacao_menor (
    idmedida_aplicada INTEGER PRIMARY KEY,
    data              TEXT,
    descricao         TEXT,
    inciso            INTEGER
);

CREATE TABLE IF NOT EXISTS medida_aplicacao_responsavel (
    idmedida_aplicada INTEGER PRIMARY KEY,
    data              TEXT,
    descricao         TEXT,
    inciso            INTEGER
);

CREATE TABLE IF NOT EXISTS marcador_mapa (
    idMarcador    INTEGER PRIMARY KEY,
    latitude      REAL NOT NULL,
    longitude     REAL NOT NULL,
    tipoDocumento TEXT,
    idDocumento   TEXT,
    endereco      TEXT,
    descricao     TEXT
);

PRAGMA user_version = 1;
";
